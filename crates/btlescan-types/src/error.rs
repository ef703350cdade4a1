//! Error types for advertisement payload parsing.

use thiserror::Error;

/// Errors that can occur when parsing raw advertising payloads.
///
/// This error type is platform-agnostic and does not include BLE stack
/// errors (those belong in btlescan-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// An AD structure declared more bytes than the payload contains.
    #[error("Truncated AD structure: declared {declared} bytes, {remaining} remaining")]
    Truncated {
        /// Length declared by the structure header.
        declared: usize,
        /// Bytes actually left in the payload.
        remaining: usize,
    },

    /// The advertised address type string is not recognized.
    #[error("Unknown address type: {0:?}")]
    UnknownAddressType(String),
}

/// Result type alias using btlescan-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::Truncated {
            declared: 10,
            remaining: 3,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("3"));

        let err = ParseError::UnknownAddressType("static".to_string());
        assert!(err.to_string().contains("static"));
    }
}
