//! The key/value store abstraction.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// A shared key/value store with expiring keys.
///
/// This is the only persistence the scanning core depends on: string
/// values, atomic set-if-not-exists for locking, an increment primitive
/// for counters, and per-key time-to-live. All state lives in the store;
/// the core itself is safely restartable.
///
/// Implementations must be safe for arbitrary concurrent access at the
/// level of these primitives. In particular [`set_nx`](Self::set_nx) must
/// be a single atomic check-and-set, never a bare get-then-set.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value for a key, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a key to a value, clearing any existing expiry.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Set a key only if it is absent. Returns whether the key was set.
    async fn set_nx(&self, key: &str, value: &str) -> Result<bool>;

    /// Increment an integer value, initializing absent keys to 1.
    /// Returns the value after the increment.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Apply a time-to-live to an existing key. No-op if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Delete a key. No-op if already absent.
    async fn delete(&self, key: &str) -> Result<()>;
}
