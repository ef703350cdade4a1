//! Distributed mutual exclusion for the scanning radio.
//!
//! The physical radio adapter supports one scan at a time, so cooperating
//! processes serialize access through a store-backed lock. The lock's TTL
//! is a safety net against crashed holders, not a correctness mechanism:
//! a live holder is expected to release explicitly.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use btlescan_store::KeyValueStore;

use crate::error::Result;

/// Store key for the radio lock. Process-wide constant: every cooperating
/// process must use the same key to contend for the same radio.
pub const LOCK_KEY: &str = "btle-lock";

/// A named mutual-exclusion token with a time-to-live.
///
/// At most one holder exists across all cooperating processes at any
/// instant: acquisition is an atomic set-if-not-exists against the store.
///
/// Known weakness: the lock carries no holder identity, so
/// [`release`](Self::release) frees the lock no matter who holds it. In a
/// deployment with untrusted or misbehaving peers, add a holder token
/// before relying on this lock.
pub struct ScanLock {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ScanLock {
    /// Create a lock on the shared radio, using [`LOCK_KEY`].
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, LOCK_KEY)
    }

    /// Create a lock with a custom key (separate radios, tests).
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Try to acquire the lock with the given time-to-live.
    ///
    /// Returns `true` if this caller now holds the lock, `false` if another
    /// holder exists. Contention has no side effects. Store failures are
    /// infrastructure errors, not contention.
    pub async fn acquire(&self, ttl: Duration) -> Result<bool> {
        if !self.store.set_nx(&self.key, "1").await? {
            debug!(key = %self.key, "lock already held");
            return Ok(false);
        }
        self.store.expire(&self.key, ttl).await?;
        debug!(key = %self.key, ttl_secs = ttl.as_secs(), "lock acquired");
        Ok(true)
    }

    /// Release the lock unconditionally. No-op if already absent.
    pub async fn release(&self) -> Result<()> {
        self.store.delete(&self.key).await?;
        debug!(key = %self.key, "lock released");
        Ok(())
    }
}
