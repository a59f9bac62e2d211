//! # Hex Encoding/Decoding Utilities
//!
//! Enhanced hex encoding and decoding helpers used for frame logging and
//! test vector construction.
//!
//! ## Usage
//!
//! ```rust
//! use aquabus_rs::util::hex::{encode_hex, decode_hex, format_hex_compact};
//!
//! let data = [0x68, 0x0F, 0x0F, 0x68];
//! assert_eq!(encode_hex(&data), "680f0f68");
//! assert_eq!(decode_hex("68 0F 0F 68").unwrap(), data);
//! assert_eq!(format_hex_compact(&data), "68 0f 0f 68");
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to lowercase hex string
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hex string to bytes
///
/// Accepts both uppercase and lowercase hex characters.
/// Whitespace is automatically stripped.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    if hex_str.is_empty() {
        return Err(HexError::EmptyString);
    }

    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Format hex data for compact display (useful for logs)
///
/// Formats data as "68 0f 0f 68" with spaces between bytes.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Helper for creating test data from hex strings
///
/// Panics on invalid hex (intended for test code only).
pub fn hex_to_bytes(hex: &str) -> Vec<u8> {
    decode_hex(hex).expect("Invalid hex in test data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let data = vec![0x68, 0x0F, 0x0F, 0x68, 0x08, 0x01, 0x78];
        let encoded = encode_hex(&data);
        let decoded = decode_hex(&encoded).unwrap();
        assert_eq!(data, decoded);
    }

    #[test]
    fn test_decode_with_whitespace() {
        let expected = vec![0x10, 0x5B, 0x01, 0x5C, 0x16];
        assert_eq!(decode_hex("10 5B 01 5C 16").unwrap(), expected);
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_hex_compact(&[0x68, 0x0F]), "68 0f");
    }

    #[test]
    fn test_errors() {
        assert!(decode_hex("").is_err());
        assert!(decode_hex("1").is_err());
        assert!(decode_hex("GG").is_err());
    }
}
