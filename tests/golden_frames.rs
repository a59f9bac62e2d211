//! Golden wire frames captured from the four meter firmware generations,
//! exercised end-to-end: structural parse, revision detection and field
//! decoding.

use aquabus_rs::meter::frame::parse_response;
use aquabus_rs::meter::version::{detect_version, ProtocolVersion};
use aquabus_rs::payload::decode::decode_reading;
use aquabus_rs::util::hex::hex_to_bytes;

/// Revision 1: bare 12-byte UserData, no trailer.
pub const GOLDEN_V1: &str = "68 0F 0F 68 08 01 78 0F 12 34 56 78 84 1C 13 00 00 12 34 9D 16";

/// Revision 2: tagged UDF trailer.
pub const GOLDEN_V2: &str =
    "68 13 13 68 08 01 78 0F 12 34 56 78 84 1C 13 00 00 12 34 02 06 4C 57 48 16";

/// Revision 3: tagged UDF trailer, voltage code in the status byte.
pub const GOLDEN_V3: &str =
    "68 13 13 68 08 01 78 0F 12 34 56 78 84 1C 13 00 00 12 34 03 06 4C 57 49 16";

/// Revision 4: tagged UDF trailer, magnet/freeze bits live in the VIF byte.
pub const GOLDEN_V4: &str =
    "68 13 13 68 08 01 78 0F 12 34 56 78 84 1C 13 00 00 12 34 04 06 4C 57 4A 16";

#[test]
fn test_all_golden_frames_detect_their_revision() {
    let cases = [
        (GOLDEN_V1, ProtocolVersion::V1),
        (GOLDEN_V2, ProtocolVersion::V2),
        (GOLDEN_V3, ProtocolVersion::V3),
        (GOLDEN_V4, ProtocolVersion::V4),
    ];
    for (hex, expected) in cases {
        let frame = parse_response(&hex_to_bytes(hex)).unwrap();
        assert!(frame.checksum_valid, "golden frame must checksum: {hex}");
        assert_eq!(detect_version(&frame), expected, "frame: {hex}");
    }
}

#[test]
fn test_all_golden_frames_decode() {
    for hex in [GOLDEN_V1, GOLDEN_V2, GOLDEN_V3, GOLDEN_V4] {
        let frame = parse_response(&hex_to_bytes(hex)).unwrap();
        let reading = decode_reading(&frame).unwrap();
        assert_eq!(reading.meter_id, 78563412);
        assert_eq!(reading.raw_value, 34120000);
        assert_eq!(reading.decimal_point, 3);
        assert_eq!(reading.diameter_mm, 15);
        assert!(reading.checksum_valid);
    }
}

#[test]
fn test_golden_trailer_fields() {
    let frame = parse_response(&hex_to_bytes(GOLDEN_V2)).unwrap();
    let reading = decode_reading(&frame).unwrap();
    let udf = reading.udf.expect("revision 2 carries a trailer");
    assert_eq!(udf.version_tag, 0x02);
    assert_eq!(udf.verification_month, 6);
    assert_eq!(udf.manufacturer, 0x4C57);

    let frame = parse_response(&hex_to_bytes(GOLDEN_V1)).unwrap();
    let reading = decode_reading(&frame).unwrap();
    assert!(reading.udf.is_none());
}

/// Flipping any single UserData byte invalidates the checksum while the
/// structural classification is unaffected.
#[test]
fn test_checksum_flip_independence() {
    let pristine = hex_to_bytes(GOLDEN_V1);
    for index in 4..pristine.len() - 2 {
        let mut corrupted = pristine.clone();
        corrupted[index] ^= 0x01;
        let frame = parse_response(&corrupted).unwrap();
        assert!(
            !frame.checksum_valid,
            "flip at byte {index} must break the checksum"
        );
        // Structural checks are independent of the checksum.
        assert_ne!(detect_version(&frame), ProtocolVersion::Unknown);
    }
}
