//! Device fingerprinting for randomized addresses.
//!
//! Devices using the BLE privacy feature rotate their advertised address,
//! which defeats address-based return-visitor tracking. For those devices a
//! quasi-stable signature is derived from the GAP metadata they keep
//! advertising across rotations.
//!
//! The signature is approximate by design: two distinct devices advertising
//! identical capability sets collide, and a device changing any one optional
//! field (say, dropping TX power) fingerprints differently. That trade-off
//! is accepted; the alternative is no identity at all.

use sha2::{Digest, Sha256};

use btlescan_types::{AdvertisementRecord, gap};

/// AD fields fed into the accumulator for randomized addresses, in this
/// fixed order. Absent fields contribute nothing, not a placeholder.
const RANDOM_ADDR_FIELDS: [u8; 6] = [
    gap::FLAGS,
    gap::TX_POWER,
    gap::INCOMPLETE_SERVICES_16,
    gap::INCOMPLETE_SERVICES_128,
    gap::COMPLETE_LOCAL_NAME,
    gap::SHORT_LOCAL_NAME,
];

/// Derive a stable pseudo-identity for an advertisement.
///
/// For `public` addresses the address itself keys the fingerprint; for
/// anything else the digest covers the advertised GAP metadata. The first
/// four hex characters of the manufacturer-specific field (the company
/// identifier as advertised) contribute in both cases.
///
/// Returns the lowercase hex SHA-256 of the accumulated string; the digest
/// is deterministic across calls and across processes.
pub fn fingerprint(record: &AdvertisementRecord) -> String {
    let mut acc = String::new();

    // Company identifier octets first, regardless of address type.
    if let Some(text) = record.field_text(gap::MANUFACTURER_SPECIFIC) {
        acc.extend(text.chars().take(4));
    }

    if record.addr_type.is_stable() {
        // A public address is static; nothing else is needed.
        acc.push_str(&record.addr);
    } else {
        for ad_type in RANDOM_ADDR_FIELDS {
            if let Some(text) = record.field_text(ad_type) {
                acc.push_str(&text);
            }
        }
    }

    let digest = Sha256::digest(acc.as_bytes());
    btlescan_types::types::hex(&digest)
}
