//! Channel policy switches.

use serde::Deserialize;

use super::types::default_true;

/// Channel behaviour that differs between networks.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// The first member of a new channel becomes its operator (default: true).
    #[serde(default = "default_true")]
    pub creator_is_operator: bool,
    /// Only channel operators may change the topic (default: true).
    #[serde(default = "default_true")]
    pub topic_requires_operator: bool,
    /// Seconds an unused invitation stays valid (default: 3600).
    #[serde(default = "default_invite_ttl")]
    pub invite_ttl_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            creator_is_operator: true,
            topic_requires_operator: true,
            invite_ttl_secs: default_invite_ttl(),
        }
    }
}

fn default_invite_ttl() -> u64 {
    3600
}
