//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::security::password;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.name must not contain spaces: '{0}'")]
    InvalidServerName(String),
    #[error("server.sid must be exactly 3 characters, got {0}")]
    InvalidSid(usize),
    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("limits.max_line_len must be at least 64, got {0}")]
    LineTooShort(usize),
    #[error("oper '{0}': password is not an argon2 or bcrypt hash")]
    PlaintextOperPassword(String),
    #[error("oper '{0}' is defined more than once")]
    DuplicateOper(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = &config.server.name;
    if name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    } else if name.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidServerName(name.clone()));
    }

    if config.server.sid.chars().count() != 3 {
        errors.push(ValidationError::InvalidSid(config.server.sid.chars().count()));
    }

    let limits = &config.limits;
    for (field, value) in [
        ("nick_max_len", limits.nick_max_len as u64),
        ("sendq_lines", limits.sendq_lines as u64),
        ("message_rate", u64::from(limits.message_rate)),
        ("message_burst", u64::from(limits.message_burst)),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroLimit(field));
        }
    }
    if limits.max_line_len < 64 {
        errors.push(ValidationError::LineTooShort(limits.max_line_len));
    }

    let mut seen = std::collections::HashSet::new();
    for oper in &config.oper {
        if !password::is_password_hash(&oper.password) {
            errors.push(ValidationError::PlaintextOperPassword(oper.name.clone()));
        }
        if !seen.insert(oper.name.as_str()) {
            errors.push(ValidationError::DuplicateOper(oper.name.clone()));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        toml::from_str(
            r#"
[server]
name = "chat.local"
[listen]
address = "127.0.0.1:6667"
"#,
        )
        .unwrap()
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(&base()).is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let mut config = base();
        config.server.name = "bad name".into();
        config.server.sid = "TOOLONG".into();
        config.limits.sendq_lines = 0;
        config.limits.max_line_len = 10;

        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::InvalidServerName(_)));
        assert!(matches!(errors[1], ValidationError::InvalidSid(7)));
        assert!(matches!(errors[2], ValidationError::ZeroLimit("sendq_lines")));
        assert!(matches!(errors[3], ValidationError::LineTooShort(10)));
    }

    #[test]
    fn rejects_plaintext_and_duplicate_opers() {
        let mut config = base();
        let hash = password::hash_password("pw").unwrap();
        config.oper = vec![
            super::super::OperBlock { name: "a".into(), password: "pw".into() },
            super::super::OperBlock { name: "b".into(), password: hash.clone() },
            super::super::OperBlock { name: "b".into(), password: hash },
        ];
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::PlaintextOperPassword(ref n) if n == "a"));
        assert!(matches!(errors[1], ValidationError::DuplicateOper(ref n) if n == "b"));
    }
}
