//! # Meter Link Error Handling
//!
//! This module defines the AquabusError enum, which represents the different
//! error types that can occur in the aquabus-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur on the meter link.
///
/// Every kind is surfaced to the registered error sink; only `Timeout`
/// triggers automatic retransmission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AquabusError {
    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// No valid response frame arrived before the deadline.
    #[error("Response timeout (attempt {attempt} of {max})")]
    Timeout { attempt: u8, max: u8 },

    /// Frame is structurally valid but its checksum does not match.
    /// Decoding still proceeds; this is diagnostic, not fatal.
    #[error("Invalid checksum: expected 0x{expected:02X}, calculated 0x{calculated:02X}")]
    ChecksumMismatch { expected: u8, calculated: u8 },

    /// Structural validation failed: sentinels, length bytes or minimum size.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// The meter answered with a negative acknowledgement byte.
    #[error("NAK received from meter")]
    NakReceived,

    /// The receive assembler exceeded the maximum frame size.
    #[error("Receive buffer overflow after {0} bytes")]
    BufferOverflow(usize),

    /// Caller misuse, e.g. a send while an exchange is outstanding.
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
}
