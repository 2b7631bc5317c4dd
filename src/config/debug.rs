//! Debug logging switches.

use serde::Deserialize;

/// Turns on verbose `debug!` output per subsystem.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DebugConfig {
    /// Raw inbound and outbound lines.
    #[serde(default)]
    pub net: bool,
    /// Registration and nick changes.
    #[serde(default)]
    pub client: bool,
    /// Membership, topic and mode changes.
    #[serde(default)]
    pub channel: bool,
    /// Dispatch decisions.
    #[serde(default)]
    pub server: bool,
}

impl DebugConfig {
    /// Whether any switch is on.
    pub fn any(&self) -> bool {
        self.net || self.client || self.channel || self.server
    }
}
