//! Error types for the protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Protocol-level failures.
///
/// Everything except [`ProtocolError::Io`] concerns a single line; a reader
/// can log it and move on to the next line.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The line is not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
    },

    /// The line exceeds the configured maximum length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Bytes seen before the line was rejected.
        actual: usize,
        /// Configured limit including CRLF.
        limit: usize,
    },

    /// The line carries a NUL or other forbidden control character.
    #[error("illegal control character {0:?}")]
    IllegalControlChar(char),

    /// The line has no recognisable verb.
    #[error("invalid message {string:?}: {cause}")]
    InvalidMessage {
        /// The offending line.
        string: String,
        /// Why it was rejected.
        cause: String,
    },
}

impl ProtocolError {
    /// Whether the reader can continue with the next line.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ProtocolError::Io(_))
    }
}
