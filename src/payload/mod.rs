//! The payload module contains the components responsible for decoding the
//! packed UserData fields of a meter response.

pub mod decode;
pub mod tables;

pub use decode::{bcd_to_u32, decode_reading, decode_status};
pub use tables::{battery_decivolts, diameter_mm};

/// A fully decoded meter response.
pub use decode::MeterReading;

/// Decoded device status flags.
pub use decode::MeterStatus;

/// The optional UDF metadata trailer.
pub use decode::UdfInfo;
