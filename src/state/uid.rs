//! Connection id generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a connection: server prefix plus six base36 digits.
pub type Uid = String;

/// Generates connection ids such as `0RLAAAAAC`.
///
/// The counter starts at 2; `AAAAAA` and `AAAAAB` are never handed out.
pub struct UidGenerator {
    sid: String,
    counter: AtomicU64,
}

const UID_COUNTER_START: u64 = 2;

impl UidGenerator {
    pub fn new(sid: String) -> Self {
        Self {
            sid,
            counter: AtomicU64::new(UID_COUNTER_START),
        }
    }

    /// Generate the next unique id.
    pub fn next(&self) -> Uid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.sid, base36_encode_6(n))
    }
}

/// Encode a number as a 6-character base36 string (wraps past 36^6).
fn base36_encode_6(mut n: u64) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut result = [b'A'; 6];

    for slot in result.iter_mut().rev() {
        *slot = CHARS[(n % 36) as usize];
        n /= 36;
    }

    result.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_unique() {
        let generator = UidGenerator::new("0RL".to_string());
        assert_eq!(generator.next(), "0RLAAAAAC");
        assert_eq!(generator.next(), "0RLAAAAAD");
        assert_ne!(generator.next(), generator.next());
    }

    #[test]
    fn base36_digits() {
        assert_eq!(base36_encode_6(0), "AAAAAA");
        assert_eq!(base36_encode_6(35), "AAAAA9");
        assert_eq!(base36_encode_6(36), "AAAABA");
    }
}
