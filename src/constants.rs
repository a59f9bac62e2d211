//! Water Meter Protocol Constants
//!
//! This module defines constants used in the meter link-layer implementation:
//! frame sentinels, length bounds, timing parameters and the bit layout of
//! the packed status fields.

/// Start sentinel of an outbound command frame
pub const METER_CMD_START: u8 = 0x10;

/// Start sentinel of an inbound response frame
pub const METER_RSP_START: u8 = 0x68;

/// End sentinel shared by both frame directions
pub const METER_FRAME_END: u8 = 0x16;

/// Negative-acknowledgement byte the meter sends instead of a frame
pub const METER_NAK: u8 = 0x15;

/// Read-current-value command code
pub const METER_CMD_READ: u8 = 0x5B;

/// Marker byte (MDH) expected at the start of UserData
pub const METER_MDH: u8 = 0x0F;

/// Maximum size of any frame, in either direction
pub const METER_MAX_FRAME: usize = 64;

/// Maximum command payload: frame minus start, command, length and checksum
pub const METER_MAX_CMD_DATA: usize = METER_MAX_FRAME - 4;

/// Minimum plausible response L field (C + A + CI + 12-byte UserData)
pub const METER_RSP_L_MIN: u8 = 15;

/// Maximum plausible response L field (header and trailer must still fit)
pub const METER_RSP_L_MAX: u8 = (METER_MAX_FRAME - 6) as u8;

/// Response frame overhead around the L-counted bytes: START L L START .. CS END
pub const METER_RSP_OVERHEAD: usize = 6;

/// End sentinel completes a frame only after this many bytes are buffered
pub const METER_RSP_MIN_COLLECTED: usize = 6;

/// Length of the common UserData prefix shared by all revisions
pub const METER_USER_DATA_LEN: usize = 12;

/// Minimum length of the optional UDF trailer (tag, month, 2-byte vendor)
pub const METER_UDF_MIN_LEN: usize = 4;

// ----------------------------------------------------------------------------
// Timing and retry
// ----------------------------------------------------------------------------

/// Line-idle hold before each transmission, required by the meter's wake-up
pub const METER_PREAMBLE_MS: u64 = 50;

/// Deadline armed after each transmission (1200 baud response fits well inside)
pub const METER_RESPONSE_TIMEOUT_MS: u64 = 500;

/// Maximum transmissions of one command (initial send plus retries)
pub const METER_MAX_RETRY: u8 = 3;

/// Cadence on which hosts should poll the engine task
pub const METER_TASK_INTERVAL_MS: u64 = 10;

/// Receive ring capacity; must stay a power of two for masked indices
pub const METER_RX_RING_CAPACITY: usize = 256;

// ----------------------------------------------------------------------------
// UserData field offsets (relative to start of UserData)
// ----------------------------------------------------------------------------

pub const METER_OFFSET_MDH: usize = 0;
pub const METER_OFFSET_ID: usize = 1;
pub const METER_OFFSET_STATUS: usize = 5;
pub const METER_OFFSET_DIF: usize = 6;
pub const METER_OFFSET_VIF: usize = 7;
pub const METER_OFFSET_VALUE: usize = 8;
pub const METER_OFFSET_UDF: usize = 12;

// ----------------------------------------------------------------------------
// UDF version tags (first trailer byte, revisions 2 and later)
// ----------------------------------------------------------------------------

pub const METER_UDF_TAG_V2: u8 = 0x02;
pub const METER_UDF_TAG_V3: u8 = 0x03;
pub const METER_UDF_TAG_V4: u8 = 0x04;

// ----------------------------------------------------------------------------
// Status byte layout
// ----------------------------------------------------------------------------

/// Q3/Q4 flow rate exceeded (all revisions)
pub const METER_STATUS_FLOW_EXCEEDED: u8 = 0x01;

/// Reverse flow detected (all revisions)
pub const METER_STATUS_REVERSE_FLOW: u8 = 0x02;

/// Indoor leak suspected (all revisions)
pub const METER_STATUS_INDOOR_LEAK: u8 = 0x04;

/// Low-battery flag (revisions 1 and 2 only)
pub const METER_STATUS_LOW_BATTERY: u8 = 0x08;

/// Shift of the 5-bit battery voltage code (revisions 3 and 4)
pub const METER_STATUS_VOLTAGE_SHIFT: u8 = 3;

/// Mask of the 5-bit battery voltage code after shifting
pub const METER_STATUS_VOLTAGE_MASK: u8 = 0x1F;

// VIF byte: low nibble is the decimal point position in every revision;
// revision 4 reuses the two high bits as extra status flags.

pub const METER_VIF_DECIMAL_MASK: u8 = 0x0F;

/// Magnetic tamper detected (revision 4, VIF byte)
pub const METER_VIF_MAGNET: u8 = 0x40;

/// Freeze warning (revision 4, VIF byte)
pub const METER_VIF_FREEZE: u8 = 0x80;
