//! Connection limits configuration.

use serde::Deserialize;

/// Per-connection limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum nickname length (default: 30).
    #[serde(default = "default_nick_max_len")]
    pub nick_max_len: usize,
    /// Maximum inbound line length including CRLF (default: 512).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Outbound queue capacity in lines (default: 1024).
    /// A client whose queue fills up is disconnected.
    #[serde(default = "default_sendq_lines")]
    pub sendq_lines: usize,
    /// Sustained inbound lines per second (default: 10).
    #[serde(default = "default_message_rate")]
    pub message_rate: u32,
    /// Inbound burst allowance in lines (default: 20).
    #[serde(default = "default_message_burst")]
    pub message_burst: u32,
    /// Seconds a connection may take to register; 0 disables (default: 60).
    #[serde(default = "default_registration_timeout")]
    pub registration_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            nick_max_len: default_nick_max_len(),
            max_line_len: default_max_line_len(),
            sendq_lines: default_sendq_lines(),
            message_rate: default_message_rate(),
            message_burst: default_message_burst(),
            registration_timeout_secs: default_registration_timeout(),
        }
    }
}

fn default_nick_max_len() -> usize {
    relay_proto::DEFAULT_NICK_MAX_LEN
}

fn default_max_line_len() -> usize {
    512
}

fn default_sendq_lines() -> usize {
    1024
}

fn default_message_rate() -> u32 {
    10
}

fn default_message_burst() -> u32 {
    20
}

fn default_registration_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_correct() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.nick_max_len, 30);
        assert_eq!(limits.max_line_len, 512);
        assert_eq!(limits.sendq_lines, 1024);
        assert_eq!(limits.message_rate, 10);
        assert_eq!(limits.message_burst, 20);
        assert_eq!(limits.registration_timeout_secs, 60);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let limits: LimitsConfig = toml::from_str("sendq_lines = 8").unwrap();
        assert_eq!(limits.sendq_lines, 8);
        assert_eq!(limits.max_line_len, 512);
    }
}
