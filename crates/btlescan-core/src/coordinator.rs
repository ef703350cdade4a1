//! Scan coordination.
//!
//! [`ScanCoordinator`] ties the pieces together: it serializes adapter access
//! through a [`ScanLock`], drives a [`BleRadio`] passive scan, annotates the
//! observed advertisements with a stable fingerprint and a manufacturer name,
//! and tracks adapter failures in an [`ErrorCounter`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use btlescan_core::{BtleplugRadio, ScanCoordinator, ScanOutcome};
//! use btlescan_store::MemoryKv;
//!
//! # async fn example() -> btlescan_core::Result<()> {
//! let store = Arc::new(MemoryKv::new());
//! let radio = Arc::new(BtleplugRadio::new().await?);
//! let coordinator = ScanCoordinator::embedded(store, radio)?;
//!
//! match coordinator.scan(Duration::from_secs(10)).await? {
//!     ScanOutcome::Complete(reports) => {
//!         for report in reports {
//!             println!("{} {}", report.fingerprint, report.record.addr);
//!         }
//!     }
//!     ScanOutcome::LockContention => println!("another scanner is active"),
//!     ScanOutcome::RadioError { failures } => println!("adapter fault ({failures} recent)"),
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use btlescan_store::KeyValueStore;
use btlescan_types::AdvertisementRecord;

use crate::counter::ErrorCounter;
use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::lock::ScanLock;
use crate::manufacturer::ManufacturerResolver;
use crate::radio::BleRadio;

/// Safety margin added to the scan timeout when sizing the lock TTL.
///
/// The lock must outlive a well-behaved scan so it is only ever reclaimed
/// from a holder that crashed, not one that is merely slow to finish.
pub const LOCK_MARGIN: Duration = Duration::from_secs(5);

/// One observed device, annotated for reporting.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeviceReport {
    /// Stable identity hash, survives random address rotation.
    pub fingerprint: String,
    /// Resolved manufacturer name, if the advertisement carried
    /// manufacturer-specific data.
    pub manufacturer: Option<String>,
    /// The raw advertisement the report was derived from.
    pub record: AdvertisementRecord,
}

/// The result of a coordinated scan attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The scan ran to completion; every observed device is reported.
    Complete(Vec<DeviceReport>),
    /// Another scanner holds the lock; nothing was scanned.
    LockContention,
    /// The adapter failed at the management level. The failure was recorded
    /// and `failures` is the count within the current error window.
    RadioError { failures: i64 },
}

/// Coordinates exclusive, annotated passive scans.
pub struct ScanCoordinator {
    lock: ScanLock,
    counter: ErrorCounter,
    resolver: ManufacturerResolver,
    radio: Arc<dyn BleRadio>,
}

impl std::fmt::Debug for ScanCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCoordinator").finish_non_exhaustive()
    }
}

impl ScanCoordinator {
    /// Create a coordinator whose resolver reads the given dataset file.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        radio: Arc<dyn BleRadio>,
        dataset_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            lock: ScanLock::new(Arc::clone(&store)),
            counter: ErrorCounter::new(Arc::clone(&store)),
            resolver: ManufacturerResolver::new(store, dataset_path),
            radio,
        }
    }

    /// Create a coordinator backed by the bundled manufacturer dataset.
    pub fn embedded(store: Arc<dyn KeyValueStore>, radio: Arc<dyn BleRadio>) -> Result<Self> {
        Ok(Self {
            lock: ScanLock::new(Arc::clone(&store)),
            counter: ErrorCounter::new(Arc::clone(&store)),
            resolver: ManufacturerResolver::embedded(store)?,
            radio,
        })
    }

    /// Run one coordinated passive scan.
    ///
    /// Acquires the scan lock with a TTL of `timeout` plus [`LOCK_MARGIN`],
    /// drives the radio, and annotates each observed advertisement. On a
    /// management-level adapter fault the failure is recorded and the lock is
    /// left to expire on its own, keeping a possibly wedged adapter fenced
    /// off until the TTL passes.
    pub async fn scan(&self, timeout: Duration) -> Result<ScanOutcome> {
        if !self.lock.acquire(timeout + LOCK_MARGIN).await? {
            debug!("scan lock held elsewhere, skipping");
            return Ok(ScanOutcome::LockContention);
        }

        let records = match self.radio.passive_scan(timeout).await {
            Ok(records) => records,
            Err(err @ Error::Management(_)) => {
                let failures = self.counter.record_failure().await?;
                warn!(error = %err, failures, "adapter management failure");
                return Ok(ScanOutcome::RadioError { failures });
            }
            Err(err) => {
                self.lock.release().await?;
                return Err(err);
            }
        };

        let mut reports = Vec::with_capacity(records.len());
        for record in records {
            match self.annotate(record).await {
                Ok(report) => reports.push(report),
                Err(err) => {
                    self.lock.release().await?;
                    return Err(err);
                }
            }
        }
        info!(devices = reports.len(), "scan complete");

        self.lock.release().await?;
        Ok(ScanOutcome::Complete(reports))
    }

    /// Run a scan, retrying on lock contention with jittered backoff.
    ///
    /// Makes up to `max_retries` additional attempts after the first, sleeping
    /// between one and two seconds before each retry. Any outcome other than
    /// [`ScanOutcome::LockContention`] is returned immediately.
    pub async fn scan_with_retry(
        &self,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<ScanOutcome> {
        let mut attempts = 0;
        loop {
            match self.scan(timeout).await? {
                ScanOutcome::LockContention if attempts < max_retries => {
                    attempts += 1;
                    let backoff =
                        Duration::from_millis(rand::rng().random_range(1000..=2000));
                    debug!(attempt = attempts, ?backoff, "lock contention, retrying");
                    tokio::time::sleep(backoff).await;
                }
                outcome => return Ok(outcome),
            }
        }
    }

    /// Adapter failures recorded within the current error window.
    pub async fn error_count(&self) -> Result<i64> {
        self.counter.current_count().await
    }

    async fn annotate(&self, record: AdvertisementRecord) -> Result<DeviceReport> {
        let manufacturer = match record.manufacturer_data() {
            Some(data) => Some(self.resolver.resolve(data).await?),
            None => None,
        };
        Ok(DeviceReport {
            fingerprint: fingerprint(&record),
            manufacturer,
            record,
        })
    }
}
