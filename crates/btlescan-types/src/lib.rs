//! Platform-agnostic types for passive BLE advertisement scanning.
//!
//! This crate provides the shared data model used by the scanning core:
//! GAP advertising-data (AD) type constants, the [`AdvertisementRecord`]
//! captured for each discovered device, and the manufacturer reference
//! dataset entry type.
//!
//! # Example
//!
//! ```
//! use btlescan_types::{AddressType, AdvertisementRecord, gap};
//!
//! let record = AdvertisementRecord::new("aa:bb:cc:dd:ee:ff", AddressType::Random)
//!     .with_field(gap::COMPLETE_LOCAL_NAME, b"Thermo 12345".to_vec());
//!
//! assert_eq!(
//!     record.field_text(gap::COMPLETE_LOCAL_NAME).as_deref(),
//!     Some("Thermo 12345")
//! );
//! ```

pub mod error;
pub mod gap;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{AddressType, AdvertisementRecord, ManufacturerEntry};
