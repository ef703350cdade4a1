//! Manufacturer code resolution.
//!
//! BLE manufacturer-specific advertising data starts with the vendor's
//! 16-bit company identifier, transmitted little-endian on the air. The
//! Bluetooth SIG assigned-numbers table is shipped as a JSON dataset; this
//! resolver looks codes up through the shared key/value store so repeated
//! resolutions never re-read the dataset, whether from a later scan cycle
//! or from a cooperating process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use btlescan_store::KeyValueStore;
use btlescan_types::ManufacturerEntry;

use crate::error::{Error, Result};

/// Cache key prefix; full keys are `manufacturer-{code}` with the code in
/// decimal.
pub const CACHE_KEY_PREFIX: &str = "manufacturer-";

/// Sentinel returned when a code is not present in the reference dataset.
/// Distinct from the dataset being unreadable, which is an error.
pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

/// Reference dataset bundled with the crate.
const BUNDLED_DATASET: &str = include_str!("../assets/company_ids.json");

fn cache_key(code: u16) -> String {
    format!("{CACHE_KEY_PREFIX}{code}")
}

/// Resolves 16-bit manufacturer codes to vendor names.
///
/// Lookup strategy is cache-then-fallback: a hit in the store answers
/// directly; the first miss loads the dataset (once per process) and warms
/// the cache with **every** entry, so any later resolution of any known
/// code is a pure cache hit. Cache entries carry no expiry.
pub struct ManufacturerResolver {
    store: Arc<dyn KeyValueStore>,
    dataset_path: PathBuf,
    dataset: OnceCell<Vec<ManufacturerEntry>>,
}

impl ManufacturerResolver {
    /// Create a resolver reading the reference dataset from `dataset_path`
    /// on first miss.
    pub fn new(store: Arc<dyn KeyValueStore>, dataset_path: impl AsRef<Path>) -> Self {
        Self {
            store,
            dataset_path: dataset_path.as_ref().to_path_buf(),
            dataset: OnceCell::new(),
        }
    }

    /// Create a resolver backed by the dataset bundled with this crate.
    pub fn embedded(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let path = PathBuf::from("<embedded>");
        let entries = parse_dataset(BUNDLED_DATASET, &path)?;
        Ok(Self {
            store,
            dataset_path: path,
            dataset: OnceCell::new_with(Some(entries)),
        })
    }

    /// Resolve from raw manufacturer-specific AD data.
    ///
    /// The first two octets are the company identifier, little-endian as
    /// advertised; any vendor payload after them is ignored.
    pub async fn resolve(&self, data: &[u8]) -> Result<String> {
        match data {
            [lo, hi, ..] => self.resolve_code(u16::from_le_bytes([*lo, *hi])).await,
            _ => Err(Error::InvalidData(format!(
                "manufacturer data needs at least 2 bytes, got {}",
                data.len()
            ))),
        }
    }

    /// Resolve a company identifier to its vendor name.
    pub async fn resolve_code(&self, code: u16) -> Result<String> {
        let key = cache_key(code);

        if let Some(name) = self.store.get(&key).await? {
            debug!(code, %name, "manufacturer cache hit");
            return Ok(name);
        }

        // Cache miss: warm the whole cache from the dataset, not only the
        // queried code, so every later lookup hits.
        let entries = self.dataset().await?;
        info!(
            code,
            entries = entries.len(),
            "manufacturer cache miss, warming from dataset"
        );

        let mut resolved = UNKNOWN_MANUFACTURER.to_string();
        for entry in entries {
            self.store.set(&cache_key(entry.code), &entry.name).await?;
            if entry.code == code {
                resolved = entry.name.clone();
            }
        }
        Ok(resolved)
    }

    /// The reference dataset, read from disk at most once per process.
    async fn dataset(&self) -> Result<&Vec<ManufacturerEntry>> {
        self.dataset
            .get_or_try_init(|| async {
                let raw = tokio::fs::read_to_string(&self.dataset_path)
                    .await
                    .map_err(|source| Error::DatasetRead {
                        path: self.dataset_path.clone(),
                        source,
                    })?;
                parse_dataset(&raw, &self.dataset_path)
            })
            .await
    }
}

fn parse_dataset(raw: &str, path: &Path) -> Result<Vec<ManufacturerEntry>> {
    serde_json::from_str(raw).map_err(|source| Error::DatasetParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use btlescan_store::MemoryKv;
    use std::io::Write;

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryKv::new())
    }

    fn dataset_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"code": 76, "name": "Apple, Inc."}}, {{"code": 6, "name": "Microsoft"}}]"#
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_resolve_known_code_cold_and_warm() {
        let file = dataset_file();
        let resolver = ManufacturerResolver::new(store(), file.path());

        // Cold: dataset load + cache warm.
        assert_eq!(resolver.resolve_code(76).await.unwrap(), "Apple, Inc.");
        // Warm: pure cache hit.
        assert_eq!(resolver.resolve_code(76).await.unwrap(), "Apple, Inc.");
        // The warm pass cached every entry, not just the queried one.
        assert_eq!(resolver.resolve_code(6).await.unwrap(), "Microsoft");
    }

    #[tokio::test]
    async fn test_resolve_swaps_advertised_byte_order() {
        let file = dataset_file();
        let resolver = ManufacturerResolver::new(store(), file.path());

        // Apple advertises 0x4C 0x00 on the air; swapped that is 0x004C = 76.
        assert_eq!(
            resolver.resolve(&[0x4C, 0x00, 0x02, 0x15]).await.unwrap(),
            "Apple, Inc."
        );
    }

    #[tokio::test]
    async fn test_unmapped_code_is_unknown() {
        let file = dataset_file();
        let resolver = ManufacturerResolver::new(store(), file.path());
        assert_eq!(
            resolver.resolve(&[0xFF, 0xFF]).await.unwrap(),
            UNKNOWN_MANUFACTURER
        );
    }

    #[tokio::test]
    async fn test_dataset_read_once_per_process() {
        let file = dataset_file();
        let path = file.path().to_path_buf();
        let resolver = ManufacturerResolver::new(store(), &path);

        assert_eq!(resolver.resolve_code(76).await.unwrap(), "Apple, Inc.");

        // Delete the dataset; resolution must keep working from cache and
        // from the in-memory copy, including for codes never seen before.
        drop(file);
        assert_eq!(resolver.resolve_code(76).await.unwrap(), "Apple, Inc.");
        assert_eq!(
            resolver.resolve_code(0xFFFE).await.unwrap(),
            UNKNOWN_MANUFACTURER
        );
    }

    #[tokio::test]
    async fn test_unreadable_dataset_is_an_error_not_unknown() {
        let resolver = ManufacturerResolver::new(store(), "/nonexistent/company_ids.json");
        assert!(matches!(
            resolver.resolve_code(76).await,
            Err(Error::DatasetRead { .. })
        ));
    }

    #[tokio::test]
    async fn test_corrupt_dataset_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let resolver = ManufacturerResolver::new(store(), file.path());
        assert!(matches!(
            resolver.resolve_code(76).await,
            Err(Error::DatasetParse { .. })
        ));
    }

    #[tokio::test]
    async fn test_short_manufacturer_data_rejected() {
        let file = dataset_file();
        let resolver = ManufacturerResolver::new(store(), file.path());
        assert!(matches!(
            resolver.resolve(&[0x4C]).await,
            Err(Error::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_embedded_dataset() {
        let resolver = ManufacturerResolver::embedded(store()).unwrap();
        assert_eq!(resolver.resolve_code(76).await.unwrap(), "Apple, Inc.");
        assert_eq!(
            resolver.resolve_code(89).await.unwrap(),
            "Nordic Semiconductor ASA"
        );
    }

    #[tokio::test]
    async fn test_external_eviction_falls_back_to_dataset() {
        let file = dataset_file();
        let store: Arc<MemoryKv> = Arc::new(MemoryKv::new());
        let resolver =
            ManufacturerResolver::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, file.path());

        assert_eq!(resolver.resolve_code(76).await.unwrap(), "Apple, Inc.");

        // Evict the cache entry behind the resolver's back.
        store.delete("manufacturer-76").await.unwrap();
        assert_eq!(resolver.resolve_code(76).await.unwrap(), "Apple, Inc.");
    }
}
