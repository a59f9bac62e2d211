//! # UserData Field Decoding
//!
//! Converts the packed UserData block of a response frame into typed values:
//! BCD meter identifier and reading, the per-revision status layout, the
//! diameter and decimal-point codes, and the optional UDF trailer carried by
//! revisions 2 and later.

use crate::constants::{
    METER_MDH, METER_OFFSET_DIF, METER_OFFSET_ID, METER_OFFSET_MDH, METER_OFFSET_STATUS,
    METER_OFFSET_UDF, METER_OFFSET_VALUE, METER_OFFSET_VIF, METER_STATUS_VOLTAGE_MASK,
    METER_STATUS_VOLTAGE_SHIFT, METER_UDF_MIN_LEN, METER_USER_DATA_LEN, METER_VIF_DECIMAL_MASK,
    METER_VIF_FREEZE, METER_VIF_MAGNET,
};
use crate::error::AquabusError;
use crate::meter::frame::ResponseFrame;
use crate::meter::version::{detect_version, ProtocolVersion};
use crate::payload::tables::{battery_decivolts, diameter_mm};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Raw status-byte bits shared by every revision.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusBits: u8 {
        const FLOW_EXCEEDED = 0x01;
        const REVERSE_FLOW  = 0x02;
        const INDOOR_LEAK   = 0x04;
        const LOW_BATTERY   = 0x08;
    }
}

/// Decoded device status. Which fields are populated depends on the
/// detected revision: the two oldest report a bare low-battery flag, the two
/// newest a 5-bit voltage code, and only revision 4 carries the magnet and
/// freeze flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterStatus {
    pub flow_exceeded: bool,
    pub reverse_flow: bool,
    pub indoor_leak: bool,
    pub low_battery: bool,
    pub battery_decivolts: Option<u8>,
    pub magnet_detected: bool,
    pub freeze_warning: bool,
}

/// The UDF metadata trailer of revisions 2 and later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdfInfo {
    pub version_tag: u8,
    pub verification_month: u8,
    pub manufacturer: u16,
}

/// A fully decoded meter response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub version: ProtocolVersion,
    pub meter_id: u32,
    /// Raw register value before decimal-point scaling.
    pub raw_value: u32,
    /// Decimal-point position from the VIF low nibble.
    pub decimal_point: u8,
    pub diameter_mm: u16,
    pub status: MeterStatus,
    pub udf: Option<UdfInfo>,
    /// Carried over from the frame; a false value flags a reported
    /// checksum mismatch without suppressing the decode.
    pub checksum_valid: bool,
}

impl MeterReading {
    /// The register value scaled by the decimal-point position.
    pub fn value(&self) -> f64 {
        self.raw_value as f64 / 10f64.powi(self.decimal_point as i32)
    }
}

/// Decodes packed-BCD bytes stored least-significant byte first.
///
/// Any nibble above 9 invalidates the whole number: the result is 0, never a
/// partial value.
pub fn bcd_to_u32(bytes: &[u8]) -> u32 {
    let mut result: u32 = 0;
    for byte in bytes.iter().rev() {
        let high = byte >> 4;
        let low = byte & 0x0F;
        if high > 9 || low > 9 {
            return 0;
        }
        result = result * 100 + (high as u32 * 10 + low as u32);
    }
    result
}

/// Decodes the status byte (and revision-4 VIF flag bits) for a revision.
pub fn decode_status(status_byte: u8, vif_byte: u8, version: ProtocolVersion) -> MeterStatus {
    let bits = StatusBits::from_bits_truncate(status_byte);
    let mut status = MeterStatus {
        flow_exceeded: bits.contains(StatusBits::FLOW_EXCEEDED),
        reverse_flow: bits.contains(StatusBits::REVERSE_FLOW),
        indoor_leak: bits.contains(StatusBits::INDOOR_LEAK),
        ..MeterStatus::default()
    };

    match version {
        ProtocolVersion::V1 | ProtocolVersion::V2 => {
            status.low_battery = bits.contains(StatusBits::LOW_BATTERY);
        }
        ProtocolVersion::V3 | ProtocolVersion::V4 => {
            let code = (status_byte >> METER_STATUS_VOLTAGE_SHIFT) & METER_STATUS_VOLTAGE_MASK;
            status.battery_decivolts = Some(battery_decivolts(code));
        }
        ProtocolVersion::Unknown => {}
    }

    if version == ProtocolVersion::V4 {
        status.magnet_detected = vif_byte & METER_VIF_MAGNET != 0;
        status.freeze_warning = vif_byte & METER_VIF_FREEZE != 0;
    }

    status
}

/// Decodes the UDF trailer when the revision carries one.
fn decode_udf(user_data: &[u8]) -> Option<UdfInfo> {
    let trailer = &user_data[METER_OFFSET_UDF..];
    if trailer.len() < METER_UDF_MIN_LEN {
        return None;
    }
    Some(UdfInfo {
        version_tag: trailer[0],
        verification_month: trailer[1],
        manufacturer: u16::from_be_bytes([trailer[2], trailer[3]]),
    })
}

/// Decodes a structurally valid response frame into a [`MeterReading`].
///
/// Fails with `InvalidFrame` when the revision cannot be classified or the
/// MDH marker is wrong; a checksum mismatch does not fail the decode.
pub fn decode_reading(frame: &ResponseFrame) -> Result<MeterReading, AquabusError> {
    let version = detect_version(frame);
    if version == ProtocolVersion::Unknown {
        return Err(AquabusError::InvalidFrame(
            "response does not match any known wire-format revision".into(),
        ));
    }

    let user_data = &frame.user_data;
    if user_data[METER_OFFSET_MDH] != METER_MDH {
        return Err(AquabusError::InvalidFrame(format!(
            "bad MDH marker 0x{:02x}",
            user_data[METER_OFFSET_MDH]
        )));
    }

    let id_bytes = &user_data[METER_OFFSET_ID..METER_OFFSET_ID + 4];
    let value_bytes = &user_data[METER_OFFSET_VALUE..METER_OFFSET_VALUE + 4];

    let status_byte = user_data[METER_OFFSET_STATUS];
    let vif_byte = user_data[METER_OFFSET_VIF];

    let udf = if user_data.len() > METER_USER_DATA_LEN {
        decode_udf(user_data)
    } else {
        None
    };

    Ok(MeterReading {
        version,
        meter_id: bcd_to_u32(id_bytes),
        raw_value: bcd_to_u32(value_bytes),
        decimal_point: vif_byte & METER_VIF_DECIMAL_MASK,
        diameter_mm: diameter_mm(user_data[METER_OFFSET_DIF] >> 4),
        status: decode_status(status_byte, vif_byte, version),
        udf,
        checksum_valid: frame.checksum_valid,
    })
}
