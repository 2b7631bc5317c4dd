//! Unified error handling for relayd.
//!
//! Handler errors never reach other clients: the dispatcher turns the
//! protocol-level ones into a numeric for the requesting client and logs the
//! rest.

use thiserror::Error;

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    /// The client record vanished mid-command (concurrent disconnect).
    #[error("client {0} is gone")]
    ClientGone(String),

    #[error("client quit: {0:?}")]
    Quit(Option<String>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams => "need_more_params",
            Self::ClientGone(_) => "client_gone",
            Self::Quit(_) => "quit",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for handlers.
pub type HandlerResult = Result<(), HandlerError>;
