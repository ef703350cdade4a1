//! Core data types for passive BLE scanning.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::gap;

/// The advertised address type of a BLE device.
///
/// Only a `Public` address is a reliable stable identifier. Devices using
/// the BLE privacy feature advertise a `Random` address that rotates
/// periodically, which is why fingerprinting exists at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AddressType {
    /// Fixed, globally-registered address.
    Public,
    /// Randomized (private) address, rotated by the device.
    Random,
}

impl AddressType {
    /// Whether the advertised address can be trusted as a stable identifier.
    pub fn is_stable(self) -> bool {
        matches!(self, Self::Public)
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Random => write!(f, "random"),
        }
    }
}

impl FromStr for AddressType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "random" => Ok(Self::Random),
            other => Err(ParseError::UnknownAddressType(other.to_string())),
        }
    }
}

/// One BLE advertising report.
///
/// Carries the advertised address, its type, and the AD structures observed
/// in the advertisement, keyed by GAP AD type. A `BTreeMap` keeps field
/// iteration deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdvertisementRecord {
    /// Advertised address, normalized to lowercase.
    pub addr: String,
    /// Address type; only `public` addresses are stable.
    pub addr_type: AddressType,
    /// Signal strength at the time of the report, if reported.
    pub rssi: Option<i16>,
    /// AD structures keyed by GAP AD type.
    pub fields: BTreeMap<u8, Vec<u8>>,
}

impl AdvertisementRecord {
    /// Create an empty record for the given address.
    pub fn new(addr: impl Into<String>, addr_type: AddressType) -> Self {
        Self {
            addr: addr.into().to_lowercase(),
            addr_type,
            rssi: None,
            fields: BTreeMap::new(),
        }
    }

    /// Attach an AD field, replacing any previous value of the same type.
    #[must_use]
    pub fn with_field(mut self, ad_type: u8, value: Vec<u8>) -> Self {
        self.fields.insert(ad_type, value);
        self
    }

    /// Set the reported signal strength.
    #[must_use]
    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// Raw bytes of an AD field, if the advertisement carried it.
    pub fn field(&self, ad_type: u8) -> Option<&[u8]> {
        self.fields.get(&ad_type).map(Vec::as_slice)
    }

    /// Textual representation of an AD field.
    ///
    /// Local-name fields decode as UTF-8 (lossy); every other type renders
    /// as lowercase hex of the raw value bytes.
    pub fn field_text(&self, ad_type: u8) -> Option<String> {
        self.field(ad_type).map(|value| {
            if gap::is_text_type(ad_type) {
                String::from_utf8_lossy(value).into_owned()
            } else {
                hex(value)
            }
        })
    }

    /// The advertised local name, preferring the complete form.
    pub fn local_name(&self) -> Option<String> {
        self.field_text(gap::COMPLETE_LOCAL_NAME)
            .or_else(|| self.field_text(gap::SHORT_LOCAL_NAME))
    }

    /// Raw manufacturer-specific data, if present.
    pub fn manufacturer_data(&self) -> Option<&[u8]> {
        self.field(gap::MANUFACTURER_SPECIFIC)
    }
}

/// One row of the manufacturer reference dataset.
///
/// The dataset is a JSON array of these entries, matching the Bluetooth SIG
/// company identifier table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManufacturerEntry {
    /// Assigned 16-bit company identifier.
    pub code: u16,
    /// Human-readable vendor name.
    pub name: String,
}

/// Lowercase hex encoding of a byte slice.
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{:02x}", b);
    }
    out
}
