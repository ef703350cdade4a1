//! Coordinated passive BLE scanning.
//!
//! This crate drives passive Bluetooth Low Energy scans through a shared
//! adapter and turns the raw advertisements into annotated device reports.
//!
//! # Features
//!
//! - **Exclusive access**: a TTL-backed scan lock serializes adapter use
//!   across processes sharing one store
//! - **Stable identity**: SHA-256 fingerprints that survive random address
//!   rotation
//! - **Manufacturer names**: company identifier resolution with a
//!   store-backed cache and a bundled Bluetooth SIG dataset
//! - **Failure tracking**: adapter faults counted in a sliding one-hour
//!   window
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use btlescan_core::{BtleplugRadio, ScanCoordinator, ScanOutcome};
//! use btlescan_store::SqliteKv;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteKv::open_default()?);
//!     let radio = Arc::new(BtleplugRadio::new().await?);
//!     let coordinator = ScanCoordinator::embedded(store, radio)?;
//!
//!     if let ScanOutcome::Complete(reports) =
//!         coordinator.scan(Duration::from_secs(10)).await?
//!     {
//!         for report in reports {
//!             println!(
//!                 "{} {} {}",
//!                 report.fingerprint,
//!                 report.record.addr,
//!                 report.manufacturer.as_deref().unwrap_or("-"),
//!             );
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod advertisement;
pub mod coordinator;
pub mod counter;
pub mod error;
pub mod fingerprint;
pub mod lock;
pub mod manufacturer;
pub mod mock;
pub mod radio;

pub use advertisement::{parse_ad_structures, record_from_payload};
pub use coordinator::{DeviceReport, ScanCoordinator, ScanOutcome, LOCK_MARGIN};
pub use counter::{ErrorCounter, ERROR_KEY, ERROR_WINDOW};
pub use error::{Error, Result};
pub use fingerprint::fingerprint;
pub use lock::{ScanLock, LOCK_KEY};
pub use manufacturer::{ManufacturerResolver, UNKNOWN_MANUFACTURER};
pub use mock::MockRadio;
pub use radio::{record_from_properties, BleRadio, BtleplugRadio};

// Re-export from btlescan-types
pub use btlescan_types::{AddressType, AdvertisementRecord, ManufacturerEntry};
