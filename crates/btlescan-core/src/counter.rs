//! Windowed counter for radio management failures.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use btlescan_store::KeyValueStore;

use crate::error::{Error, Result};

/// Store key for the radio failure counter.
pub const ERROR_KEY: &str = "btle-error";

/// How long a failure keeps the window open. The window slides forward
/// with every failure; recovery is purely time-based.
pub const ERROR_WINDOW: Duration = Duration::from_secs(3600);

/// Tracks radio management failures within a rolling one-hour window.
///
/// The count is only ever incremented; once the window elapses with no new
/// failures the store expires the key and the count reads as zero again.
/// Callers use the count for observability and backoff decisions.
pub struct ErrorCounter {
    store: Arc<dyn KeyValueStore>,
    key: String,
    window: Duration,
}

impl ErrorCounter {
    /// Create a counter on [`ERROR_KEY`] with the standard window.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, ERROR_KEY, ERROR_WINDOW)
    }

    /// Create a counter with a custom key and window (tests).
    pub fn with_key(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        window: Duration,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            window,
        }
    }

    /// Record one failure and slide the expiry window forward.
    ///
    /// Returns the count after the increment; the first failure in a fresh
    /// window yields 1.
    pub async fn record_failure(&self) -> Result<i64> {
        let count = self.store.incr(&self.key).await?;
        self.store.expire(&self.key, self.window).await?;
        warn!(key = %self.key, count, "radio failure recorded");
        Ok(count)
    }

    /// The current failure count, or 0 if the window expired or no failure
    /// was ever recorded.
    pub async fn current_count(&self) -> Result<i64> {
        match self.store.get(&self.key).await? {
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| Error::InvalidData(format!("bad counter value {value:?}"))),
            None => Ok(0),
        }
    }
}
