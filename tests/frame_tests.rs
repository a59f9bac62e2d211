//! Unit tests for the `frame` module: packing of command frames, the two
//! checksum algorithms, and structural parsing of response frames.

use aquabus_rs::error::AquabusError;
use aquabus_rs::meter::frame::{
    pack_command, parse_response, sum_checksum, xor_checksum, CommandFrame,
};
use aquabus_rs::util::hex::hex_to_bytes;

/// Tests that a read command packs to the documented wire bytes.
#[test]
fn test_pack_read_command() {
    let frame = CommandFrame {
        command: 0x5B,
        address: 0x01,
        data: vec![0x5C],
    };
    let packed = pack_command(&frame).unwrap();
    assert_eq!(packed, vec![0x10, 0x5B, 0x01, 0x5C, 0x16]);
}

/// Tests that an empty-payload command carries a zero length byte.
#[test]
fn test_pack_command_without_payload() {
    let frame = CommandFrame {
        command: 0x5B,
        address: 0x01,
        data: vec![],
    };
    let packed = pack_command(&frame).unwrap();
    assert_eq!(packed, vec![0x10, 0x5B, 0x00, 0x10 ^ 0x5B]);
}

/// Tests that the address never appears on the wire.
#[test]
fn test_pack_command_address_not_on_wire() {
    let a = CommandFrame {
        command: 0x5B,
        address: 0x01,
        data: vec![0x5C],
    };
    let b = CommandFrame {
        command: 0x5B,
        address: 0xFE,
        data: vec![0x5C],
    };
    assert_eq!(pack_command(&a).unwrap(), pack_command(&b).unwrap());
}

/// Tests that an oversized payload is rejected with InvalidParam.
#[test]
fn test_pack_command_payload_too_large() {
    let frame = CommandFrame {
        command: 0x5B,
        address: 0x01,
        data: vec![0u8; 61],
    };
    assert!(matches!(
        pack_command(&frame),
        Err(AquabusError::InvalidParam(_))
    ));
    // The largest payload that still fits must pack.
    let frame = CommandFrame {
        command: 0x5B,
        address: 0x01,
        data: vec![0u8; 60],
    };
    assert!(pack_command(&frame).is_ok());
}

/// Tests the two checksum algorithms against each other: the directions use
/// different algorithms by design.
#[test]
fn test_checksum_algorithms_differ() {
    let bytes = [0x10, 0x5B, 0x01, 0x5C];
    assert_eq!(xor_checksum(&bytes), 0x16);
    assert_eq!(sum_checksum(&bytes), 0xC8);
}

#[test]
fn test_sum_checksum_wraps() {
    assert_eq!(sum_checksum(&[0xFF, 0x02]), 0x01);
    assert_eq!(sum_checksum(&[]), 0x00);
}

/// Tests that a valid response frame parses with all fields populated.
#[test]
fn test_parse_response() {
    let raw = hex_to_bytes("680F0F68080178 0F12345678 841C13 00001234 9D16");
    let frame = parse_response(&raw).unwrap();
    assert_eq!(frame.control, 0x08);
    assert_eq!(frame.address, 0x01);
    assert_eq!(frame.control_information, 0x78);
    assert_eq!(frame.user_data.len(), 12);
    assert_eq!(frame.checksum, 0x9D);
    assert!(frame.checksum_valid);
    assert!(frame.checksum_error().is_none());
}

/// Tests that a checksum mismatch is reported but does not fail the parse.
#[test]
fn test_parse_response_bad_checksum_still_parses() {
    let raw = hex_to_bytes("680F0F68080178 0F12345678 841C13 00001234 9E16");
    let frame = parse_response(&raw).unwrap();
    assert!(!frame.checksum_valid);
    match frame.checksum_error() {
        Some(AquabusError::ChecksumMismatch {
            expected,
            calculated,
        }) => {
            assert_eq!(expected, 0x9E);
            assert_eq!(calculated, 0x9D);
        }
        other => panic!("expected checksum mismatch, got {other:?}"),
    }
}

/// Tests that unequal length bytes fail structural validation.
#[test]
fn test_parse_response_unequal_lengths() {
    let raw = hex_to_bytes("680F1068080178 0F12345678 841C13 00001234 9D16");
    assert!(matches!(
        parse_response(&raw),
        Err(AquabusError::InvalidFrame(_))
    ));
}

/// Tests that a wrong start sentinel fails structural validation.
#[test]
fn test_parse_response_bad_sentinels() {
    let raw = hex_to_bytes("690F0F68080178 0F12345678 841C13 00001234 9D16");
    assert!(parse_response(&raw).is_err());

    // Second start sentinel wrong.
    let raw = hex_to_bytes("680F0F69080178 0F12345678 841C13 00001234 9D16");
    assert!(parse_response(&raw).is_err());

    // End sentinel wrong.
    let raw = hex_to_bytes("680F0F68080178 0F12345678 841C13 00001234 9D17");
    assert!(parse_response(&raw).is_err());
}

/// Tests that the L field must match the actual byte count.
#[test]
fn test_parse_response_length_mismatch() {
    // L claims 16 but only 15 bytes follow before checksum and end.
    let raw = hex_to_bytes("68101068080178 0F12345678 841C13 00001234 9D16");
    assert!(parse_response(&raw).is_err());
}

/// Tests that an implausibly small L is rejected even with matching bytes.
#[test]
fn test_parse_response_l_out_of_range() {
    // L = 3: C, A, CI and no UserData at all.
    let raw = hex_to_bytes("680303680801788116");
    assert!(matches!(
        parse_response(&raw),
        Err(AquabusError::InvalidFrame(_))
    ));
}

/// Tests that trailing bytes after the end sentinel are rejected.
#[test]
fn test_parse_response_trailing_bytes() {
    let raw = hex_to_bytes("680F0F68080178 0F12345678 841C13 00001234 9D16 FF");
    assert!(matches!(
        parse_response(&raw),
        Err(AquabusError::InvalidFrame(_))
    ));
}
