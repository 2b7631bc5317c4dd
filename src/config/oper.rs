//! Operator block configuration.

use serde::Deserialize;

use crate::security::password;

/// Operator block configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OperBlock {
    /// Operator name (used in OPER command).
    pub name: String,
    /// Password hash: an Argon2 PHC string (see `relayd --genpasswd`) or a
    /// bcrypt `$2*$` hash.
    pub password: String,
}

impl OperBlock {
    /// Verify the provided password against the stored hash.
    pub fn verify_password(&self, candidate: &str) -> bool {
        password::verify_password(candidate, &self.password)
    }
}
