//! Mock radio implementation for testing.
//!
//! [`MockRadio`] implements [`BleRadio`] so coordinator behavior can be
//! exercised without BLE hardware.
//!
//! # Features
//!
//! - **Failure injection**: fail the next n scans with a management error
//! - **Canned records**: return a fixed set of advertisement records
//! - **Scan counting**: assert how often the radio was actually driven

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use btlescan_types::AdvertisementRecord;

use crate::error::{Error, Result};
use crate::radio::BleRadio;

/// A mock scanning radio for testing.
#[derive(Default)]
pub struct MockRadio {
    records: RwLock<Vec<AdvertisementRecord>>,
    scan_count: AtomicU32,
    remaining_failures: AtomicU32,
}

impl std::fmt::Debug for MockRadio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRadio")
            .field("scan_count", &self.scan_count.load(Ordering::Relaxed))
            .field(
                "remaining_failures",
                &self.remaining_failures.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl MockRadio {
    /// Create a radio that observes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a radio that observes the given records on every scan.
    pub fn with_records(records: Vec<AdvertisementRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Replace the records returned by future scans.
    pub async fn set_records(&self, records: Vec<AdvertisementRecord>) {
        *self.records.write().await = records;
    }

    /// Fail the next `n` scans with a management error.
    pub fn fail_next(&self, n: u32) {
        self.remaining_failures.store(n, Ordering::SeqCst);
    }

    /// How many times a scan was attempted.
    pub fn scan_count(&self) -> u32 {
        self.scan_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BleRadio for MockRadio {
    async fn passive_scan(&self, _timeout: Duration) -> Result<Vec<AdvertisementRecord>> {
        self.scan_count.fetch_add(1, Ordering::SeqCst);

        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::management("mock adapter fault"));
        }

        Ok(self.records.read().await.clone())
    }
}
