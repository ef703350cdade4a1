//! Raw BLE advertising payload parsing.
//!
//! An advertising payload is a sequence of AD structures, each encoded as
//! `length (1 byte) | ad_type (1 byte) | value (length-1 bytes)`. This
//! module parses that wire form into [`AdvertisementRecord`] fields for
//! radio backends that expose the raw payload (e.g. HCI monitors), and is
//! the reference implementation the mock radio and tests build records
//! against.

use bytes::Buf;

use btlescan_types::{AddressType, AdvertisementRecord, ParseError, ParseResult};

/// Parse a raw advertising payload into `(ad_type, value)` elements.
///
/// A zero length octet terminates the significant part of the payload early;
/// anything after it is padding and is ignored.
///
/// # Errors
///
/// Returns [`ParseError::Truncated`] if an AD structure declares more bytes
/// than the payload contains. Malformed input never panics.
pub fn parse_ad_structures(payload: &[u8]) -> ParseResult<Vec<(u8, Vec<u8>)>> {
    let mut buf = payload;
    let mut elements = Vec::new();

    while buf.has_remaining() {
        let declared = buf.get_u8() as usize;
        if declared == 0 {
            break;
        }
        if buf.remaining() < declared {
            return Err(ParseError::Truncated {
                declared,
                remaining: buf.remaining(),
            });
        }
        let ad_type = buf.get_u8();
        let value = buf.copy_to_bytes(declared - 1).to_vec();
        elements.push((ad_type, value));
    }

    Ok(elements)
}

/// Build an [`AdvertisementRecord`] from an address and a raw payload.
///
/// Later occurrences of an AD type replace earlier ones, matching how
/// scan-response data overlays advertising data.
pub fn record_from_payload(
    addr: &str,
    addr_type: AddressType,
    payload: &[u8],
) -> ParseResult<AdvertisementRecord> {
    let mut record = AdvertisementRecord::new(addr, addr_type);
    for (ad_type, value) in parse_ad_structures(payload)? {
        record.fields.insert(ad_type, value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use btlescan_types::gap;

    #[test]
    fn test_parse_typical_payload() {
        // Flags, complete local name "ABCD", Apple manufacturer prefix.
        let payload: &[u8] = &[
            0x02, 0x01, 0x06, // Flags = 0x06
            0x05, 0x09, b'A', b'B', b'C', b'D', // Complete Local Name
            0x03, 0xFF, 0x4C, 0x00, // Manufacturer-Specific
        ];

        let record =
            record_from_payload("AA:BB:CC:DD:EE:FF", AddressType::Random, payload).unwrap();

        assert_eq!(record.field(gap::FLAGS), Some(&[0x06][..]));
        assert_eq!(
            record.field_text(gap::COMPLETE_LOCAL_NAME).as_deref(),
            Some("ABCD")
        );
        assert_eq!(
            record.field_text(gap::MANUFACTURER_SPECIFIC).as_deref(),
            Some("4c00")
        );
    }

    #[test]
    fn test_parse_empty_payload() {
        assert!(parse_ad_structures(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_zero_length_terminates() {
        // One valid structure, then a zero length octet and garbage padding.
        let payload: &[u8] = &[0x02, 0x0A, 0xF4, 0x00, 0xDE, 0xAD];
        let elements = parse_ad_structures(payload).unwrap();
        assert_eq!(elements, vec![(gap::TX_POWER, vec![0xF4])]);
    }

    #[test]
    fn test_truncated_structure() {
        // Declares 5 bytes but only 2 follow.
        let payload: &[u8] = &[0x05, 0x09, b'A'];
        let err = parse_ad_structures(payload).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Truncated {
                declared: 5,
                remaining: 2
            }
        ));
    }

    #[test]
    fn test_duplicate_type_last_wins() {
        let payload: &[u8] = &[
            0x04, 0x08, b'T', b'h', b'e', // Short name from advertising data
            0x07, 0x08, b'T', b'h', b'e', b'r', b'm', b'o', // from scan response
        ];
        let record = record_from_payload("aa:bb:cc:dd:ee:ff", AddressType::Random, payload).unwrap();
        assert_eq!(
            record.field_text(gap::SHORT_LOCAL_NAME).as_deref(),
            Some("Thermo")
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing random payload bytes should never panic.
        /// It may return an error, but should always be safe.
        #[test]
        fn parse_ad_structures_never_panics(payload: Vec<u8>) {
            let _ = parse_ad_structures(&payload);
        }

        /// Well-formed payloads always parse.
        #[test]
        fn single_structure_round_trips(ad_type: u8, value in proptest::collection::vec(any::<u8>(), 0..=28)) {
            let mut payload = vec![(value.len() + 1) as u8, ad_type];
            payload.extend_from_slice(&value);

            let elements = parse_ad_structures(&payload).unwrap();
            prop_assert_eq!(elements, vec![(ad_type, value)]);
        }
    }
}
