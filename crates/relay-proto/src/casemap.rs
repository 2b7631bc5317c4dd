//! RFC 1459 case mapping.
//!
//! Nicks and channel names compare case-insensitively, with `[]\~` treated as
//! the upper-case forms of `{}|^`. Registries key on the folded form.

/// Fold one character using the RFC 1459 mapping.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Fold a whole string; the result is the registry key for a nick or channel.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Case-insensitive equality under the RFC 1459 mapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(x, y)| irc_lower_char(x) == irc_lower_char(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn folds_ascii_and_specials() {
        assert_eq!(irc_to_lower("ALICE"), "alice");
        assert_eq!(irc_to_lower("#Rust[1]"), "#rust{1}");
        assert_eq!(irc_to_lower("Bob\\Away"), "bob|away");
        assert_eq!(irc_to_lower("x~y"), "x^y");
    }

    #[test]
    fn equality_ignores_case_mapping() {
        assert!(irc_eq("Alice[]", "aLICE{}"));
        assert!(!irc_eq("alice", "alicia"));
        assert!(!irc_eq("a", "ab"));
    }

    proptest! {
        #[test]
        fn folding_is_idempotent(s in "\\PC{0,40}") {
            let once = irc_to_lower(&s);
            prop_assert_eq!(irc_to_lower(&once), once.clone());
            prop_assert!(irc_eq(&s, &once));
        }
    }
}
