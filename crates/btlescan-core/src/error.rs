//! Error types for btlescan-core.
//!
//! The error taxonomy follows how callers are expected to react:
//!
//! | Error | Strategy | Rationale |
//! |-------|----------|-----------|
//! | [`Error::Management`] | Counted, scan skipped | Transient adapter/driver fault |
//! | [`Error::Bluetooth`] | Retry later | Adapter discovery hiccup |
//! | [`Error::Store`] | Propagate | No local recovery without the store |
//! | [`Error::DatasetRead`] / [`Error::DatasetParse`] | Fix deployment | Reference dataset missing or corrupt |
//! | [`Error::Parse`] | Do not retry | Malformed advertisement payload |
//!
//! Lock contention is deliberately NOT an error: it is an expected outcome
//! of sharing one radio, surfaced as [`ScanOutcome::LockContention`]
//! (see [`crate::coordinator`]) rather than exceptional control flow. The
//! same goes for a counted radio failure, surfaced as
//! [`ScanOutcome::RadioError`].
//!
//! [`ScanOutcome::LockContention`]: crate::coordinator::ScanOutcome::LockContention
//! [`ScanOutcome::RadioError`]: crate::coordinator::ScanOutcome::RadioError

use std::path::PathBuf;

use thiserror::Error;

use btlescan_types::ParseError;

/// Errors that can occur while coordinating BLE scans.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy stack error outside a running scan
    /// (adapter discovery, platform session setup).
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Radio management failure during a scan: adapter reset, permission
    /// failure, or a driver fault. These are counted by the failure counter.
    #[error("Radio management failure: {0}")]
    Management(String),

    /// No Bluetooth adapter available.
    #[error("No Bluetooth adapter available")]
    NoAdapter,

    /// Key/value store failure. Infrastructure-level; the coordinator
    /// cannot make progress without the store.
    #[error("Store error: {0}")]
    Store(#[from] btlescan_store::Error),

    /// The manufacturer reference dataset could not be read.
    /// Distinct from a code simply being absent from the dataset.
    #[error("Cannot read manufacturer dataset {path}: {source}")]
    DatasetRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The manufacturer reference dataset is not valid JSON.
    #[error("Cannot parse manufacturer dataset {path}: {source}")]
    DatasetParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to parse an advertisement payload.
    #[error("Invalid advertisement: {0}")]
    Parse(#[from] ParseError),

    /// Data did not have the expected shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Create a management failure with context.
    pub fn management(message: impl Into<String>) -> Self {
        Self::Management(message.into())
    }

    /// Whether this error is the distinguished radio-management failure
    /// that the coordinator counts instead of propagating.
    pub fn is_management(&self) -> bool {
        matches!(self, Self::Management(_))
    }
}

/// Result type alias using btlescan-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::management("adapter reset");
        assert_eq!(err.to_string(), "Radio management failure: adapter reset");

        let err = Error::NoAdapter;
        assert_eq!(err.to_string(), "No Bluetooth adapter available");

        let err = Error::InvalidData("bad field".to_string());
        assert_eq!(err.to_string(), "Invalid data: bad field");
    }

    #[test]
    fn test_is_management() {
        assert!(Error::management("fault").is_management());
        assert!(!Error::NoAdapter.is_management());
        assert!(!Error::InvalidData("x".into()).is_management());
    }

    #[test]
    fn test_store_error_conversion() {
        fn _assert_from_impl<T: From<btlescan_store::Error>>() {}
        _assert_from_impl::<Error>();
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: Error = ParseError::Truncated {
            declared: 5,
            remaining: 1,
        }
        .into();
        assert!(matches!(err, Error::Parse(_)));
    }
}
