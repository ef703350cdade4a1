//! In-memory key/value store for tests and single-process use.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    deadline: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| d <= now)
    }
}

/// HashMap-backed [`KeyValueStore`].
///
/// Expiry uses the tokio clock, so TTL behavior can be tested with
/// `#[tokio::test(start_paused = true)]` and `tokio::time::advance`.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryKv {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Time remaining before a key expires.
    ///
    /// `None` if the key is absent, expired, or has no expiry set.
    pub async fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        let now = Instant::now();
        if entry.expired(now) {
            return None;
        }
        entry.deadline.map(|d| d - now)
    }

    /// Number of live (non-expired) keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries.values().filter(|e| !e.expired(now)).count()
    }

    /// Whether the store holds no live keys.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: None,
            },
        );
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        if entries.get(key).is_some_and(|e| !e.expired(now)) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: None,
            },
        );
        Ok(true)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let current = match entries.get(key) {
            Some(entry) if !entry.expired(now) => {
                entry
                    .value
                    .parse::<i64>()
                    .map_err(|_| Error::InvalidValue {
                        key: key.to_string(),
                        value: entry.value.clone(),
                    })?
            }
            _ => 0,
        };
        let next = current + 1;
        // Increment preserves an existing expiry; a fresh key has none.
        let deadline = entries
            .get(key)
            .filter(|e| !e.expired(now))
            .and_then(|e| e.deadline);
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                deadline,
            },
        );
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        if entries.get(key).is_some_and(|e| e.expired(now)) {
            entries.remove(key);
        } else if let Some(entry) = entries.get_mut(key) {
            entry.deadline = Some(now + ttl);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryKv::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        // Deleting an absent key is a no-op.
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_set_nx() {
        let store = MemoryKv::new();
        assert!(store.set_nx("k", "1").await.unwrap());
        assert!(!store.set_nx("k", "2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_nx_after_expiry() {
        let store = MemoryKv::new();
        assert!(store.set_nx("k", "1").await.unwrap());
        store.expire("k", Duration::from_secs(10)).await.unwrap();

        advance(Duration::from_secs(11)).await;
        assert!(store.set_nx("k", "2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry() {
        let store = MemoryKv::new();
        store.set("k", "v").await.unwrap();
        store.expire("k", Duration::from_secs(60)).await.unwrap();

        advance(Duration::from_secs(59)).await;
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        advance(Duration::from_secs(2)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_ttl() {
        let store = MemoryKv::new();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.remaining_ttl("k").await, None);

        store.expire("k", Duration::from_secs(35)).await.unwrap();
        assert_eq!(store.remaining_ttl("k").await, Some(Duration::from_secs(35)));

        advance(Duration::from_secs(5)).await;
        assert_eq!(store.remaining_ttl("k").await, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_incr_initializes_to_one() {
        let store = MemoryKv::new();
        assert_eq!(store.incr("count").await.unwrap(), 1);
        assert_eq!(store.incr("count").await.unwrap(), 2);
        assert_eq!(store.get("count").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_incr_preserves_expiry() {
        let store = MemoryKv::new();
        store.incr("count").await.unwrap();
        store.expire("count", Duration::from_secs(60)).await.unwrap();

        advance(Duration::from_secs(30)).await;
        assert_eq!(store.incr("count").await.unwrap(), 2);
        assert_eq!(
            store.remaining_ttl("count").await,
            Some(Duration::from_secs(30))
        );
    }

    #[tokio::test]
    async fn test_incr_rejects_non_numeric() {
        let store = MemoryKv::new();
        store.set("k", "not-a-number").await.unwrap();
        assert!(matches!(
            store.incr("k").await,
            Err(Error::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_set_clears_expiry() {
        let store = MemoryKv::new();
        store.set("k", "v").await.unwrap();
        store.expire("k", Duration::from_secs(10)).await.unwrap();
        store.set("k", "w").await.unwrap();
        assert_eq!(store.remaining_ttl("k").await, None);
    }
}
