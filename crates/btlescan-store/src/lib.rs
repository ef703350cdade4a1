//! Shared key/value persistence for scan coordination.
//!
//! This crate provides the [`KeyValueStore`] abstraction the scanning core
//! coordinates through: a string key/value store with expiring keys, used
//! for the radio lock, the failure counter, and the manufacturer cache.
//!
//! Two implementations are provided:
//!
//! - [`SqliteKv`]: SQLite-backed, values survive process restarts and
//!   expired keys auto-delete. Suitable for cooperating processes on one
//!   host sharing a database file.
//! - [`MemoryKv`]: in-process HashMap, for tests and single-process use.
//!
//! # Example
//!
//! ```no_run
//! use btlescan_store::{KeyValueStore, SqliteKv};
//! use std::time::Duration;
//!
//! # async fn example() -> btlescan_store::Result<()> {
//! let store = SqliteKv::open_default()?;
//!
//! if store.set_nx("btle-lock", "1").await? {
//!     store.expire("btle-lock", Duration::from_secs(35)).await?;
//!     // ... scan ...
//!     store.delete("btle-lock").await?;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod kv;
mod memory;
mod sqlite;

pub use error::{Error, Result};
pub use kv::KeyValueStore;
pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/btlescan/kv.db`
/// - macOS: `~/Library/Application Support/btlescan/kv.db`
/// - Windows: `C:\Users\<user>\AppData\Local\btlescan\kv.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("btlescan")
        .join("kv.db")
}
