//! # aquabus-rs - A Rust Crate for Digital Water Meter Communication
//!
//! The aquabus-rs crate implements the serial link protocol of a family of
//! digital water meters: a 1200 bit/s, 8N1 point-to-point line carrying
//! XOR-checksummed command frames out and sum-checksummed response frames
//! back.
//!
//! ## Features
//!
//! - Build command frames and parse/validate response frames
//! - Assemble responses byte-by-byte from an arbitrarily fragmented stream
//! - Auto-detect which of four historical wire-format revisions a response
//!   uses
//! - Decode packed fields: BCD meter id and register, per-revision status
//!   flags, pipe-diameter and battery-voltage codes, the optional UDF
//!   metadata trailer
//! - Drive the exchange with a timeout/retry state machine polled by the
//!   host
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aquabus_rs::{connect, AquabusError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AquabusError> {
//!     let mut handle = connect("/dev/ttyUSB0").await?;
//!     let reading = handle.read_meter(0x01).await?;
//!     println!("meter {} reads {}", reading.meter_id, reading.value());
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;
pub mod logging;
pub mod meter;
pub mod payload;
pub mod util;

pub use crate::error::AquabusError;
pub use crate::logging::{init_logger, log_info};

// Core link types
pub use meter::serial::MeterDeviceHandle;
pub use meter::{
    CommandFrame, EngineState, ProtocolEngine, ProtocolVersion, ResponseFrame,
};
pub use payload::{MeterReading, MeterStatus, UdfInfo};

/// Connect to a meter via serial port.
///
/// # Arguments
/// * `port` - Serial port path (e.g., "/dev/ttyUSB0" on Linux, "COM3" on Windows)
///
/// # Returns
/// * `Ok(MeterDeviceHandle)` - Connected device handle for communication
/// * `Err(AquabusError)` - Connection failed
pub async fn connect(port: &str) -> Result<MeterDeviceHandle, AquabusError> {
    MeterDeviceHandle::connect(port).await
}

/// Perform one read exchange with the meter and return the decoded reading.
///
/// # Arguments
/// * `handle` - Device handle to communicate through
/// * `address` - Target device address (accepted for API symmetry; the link
///   is point-to-point)
///
/// # Returns
/// * `Ok(MeterReading)` - Decoded response
/// * `Err(AquabusError)` - The error that ended the exchange
pub async fn read_meter(
    handle: &mut MeterDeviceHandle,
    address: u8,
) -> Result<MeterReading, AquabusError> {
    handle.read_meter(address).await
}
