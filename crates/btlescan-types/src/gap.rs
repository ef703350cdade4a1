//! Generic Access Profile (GAP) advertising-data type codes.
//!
//! These are the assigned numbers for AD structure types as published by the
//! Bluetooth SIG. Only the types that matter for device fingerprinting and
//! manufacturer resolution are listed.

/// Flags (discoverability, BR/EDR support bits).
pub const FLAGS: u8 = 0x01;

/// Incomplete list of 16-bit service class UUIDs.
pub const INCOMPLETE_SERVICES_16: u8 = 0x02;

/// Complete list of 16-bit service class UUIDs.
pub const COMPLETE_SERVICES_16: u8 = 0x03;

/// Incomplete list of 128-bit service class UUIDs.
pub const INCOMPLETE_SERVICES_128: u8 = 0x06;

/// Complete list of 128-bit service class UUIDs.
pub const COMPLETE_SERVICES_128: u8 = 0x07;

/// Shortened local name.
pub const SHORT_LOCAL_NAME: u8 = 0x08;

/// Complete local name.
pub const COMPLETE_LOCAL_NAME: u8 = 0x09;

/// TX power level in dBm (one signed byte).
pub const TX_POWER: u8 = 0x0A;

/// Service data, 16-bit service UUID.
pub const SERVICE_DATA_16: u8 = 0x16;

/// Manufacturer-specific data. The first two octets are the company
/// identifier, little-endian on the air.
pub const MANUFACTURER_SPECIFIC: u8 = 0xFF;

/// Returns true for AD types whose value is human-readable text
/// (the local name types) rather than opaque bytes.
pub fn is_text_type(ad_type: u8) -> bool {
    ad_type == SHORT_LOCAL_NAME || ad_type == COMPLETE_LOCAL_NAME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_types() {
        assert!(is_text_type(SHORT_LOCAL_NAME));
        assert!(is_text_type(COMPLETE_LOCAL_NAME));
        assert!(!is_text_type(FLAGS));
        assert!(!is_text_type(MANUFACTURER_SPECIFIC));
    }
}
