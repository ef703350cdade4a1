//! SQLite-backed key/value store.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;

/// SQLite-based [`KeyValueStore`].
///
/// Values persist across process restarts; expired keys are purged lazily
/// on access, so a key whose TTL elapsed behaves exactly as if the store
/// had deleted it. Cooperating processes on one host can share the same
/// database file; SQLite serializes the writes.
pub struct SqliteKv {
    conn: Mutex<Connection>,
}

impl SqliteKv {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening key/value store at {}", path.display());
        let conn = Connection::open(path)?;

        // WAL mode so concurrent readers do not block the writer
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Create the schema.
fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            expires_at INTEGER
        );",
    )?;
    Ok(())
}

fn now_ts() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Remove the row for `key` if its TTL has elapsed.
fn purge_expired(conn: &Connection, key: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM kv WHERE key = ?1 AND expires_at IS NOT NULL AND expires_at <= ?2",
        rusqlite::params![key, now_ts()],
    )?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for SqliteKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        purge_expired(&conn, key)?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO kv (key, value, expires_at) VALUES (?1, ?2, NULL)
             ON CONFLICT(key) DO UPDATE SET value = ?2, expires_at = NULL",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        purge_expired(&conn, key)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO kv (key, value, expires_at) VALUES (?1, ?2, NULL)",
            rusqlite::params![key, value],
        )?;
        Ok(inserted == 1)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let conn = self.conn.lock().await;
        purge_expired(&conn, key)?;

        let current: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;

        let current = match current {
            Some(value) => value.parse::<i64>().map_err(|_| Error::InvalidValue {
                key: key.to_string(),
                value,
            })?,
            None => 0,
        };
        let next = current + 1;

        // The upsert leaves expires_at untouched for an existing key, so an
        // increment does not clear a pending expiry.
        conn.execute(
            "INSERT INTO kv (key, value, expires_at) VALUES (?1, ?2, NULL)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            rusqlite::params![key, next.to_string()],
        )?;
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let conn = self.conn.lock().await;
        purge_expired(&conn, key)?;
        // Timestamps have second granularity; round fractional TTLs up so a
        // short-but-nonzero TTL never produces an already-expired key.
        let ttl_secs = ttl.as_secs() + (ttl.subsec_nanos() != 0) as u64;
        conn.execute(
            "UPDATE kv SET expires_at = ?2 WHERE key = ?1",
            rusqlite::params![key, now_ts() + ttl_secs as i64],
        )?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}
