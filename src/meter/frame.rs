//! # Meter Frame Encoding and Decoding
//!
//! This module builds outbound command frames and parses inbound response
//! frames for the water-meter link, using the `nom` crate for the structural
//! parse of responses.
//!
//! ## Wire formats
//!
//! Command (master to meter):
//! ```text
//! [START=0x10][CMD][LEN][DATA x LEN][CS]       CS = XOR(START..DATA)
//! ```
//!
//! Response (meter to master):
//! ```text
//! [START=0x68][L][L][START=0x68][C][A][CI][UserData x (L-3)][CS][END=0x16]
//! CS = SUM mod 256 over (C, A, CI, UserData)
//! ```
//!
//! The two directions use different checksum algorithms. That asymmetry
//! matches the meter's paper protocol and must not be unified.
//!
//! A checksum mismatch on a response does not abort parsing: the frame is
//! returned with `checksum_valid == false` so callers can still decode and
//! report the mismatch separately.

use crate::constants::{
    METER_CMD_START, METER_FRAME_END, METER_MAX_CMD_DATA, METER_RSP_L_MAX, METER_RSP_L_MIN,
    METER_RSP_OVERHEAD, METER_RSP_START,
};
use crate::error::AquabusError;
use nom::bytes::complete::{tag, take};
use nom::number::complete::be_u8;
use nom::Err as NomErr;
use nom::IResult;

/// An outbound command, packed on demand by [`pack_command`].
///
/// The address is accepted for API symmetry with multi-drop masters but does
/// not appear on the wire; this link is point-to-point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub command: u8,
    pub address: u8,
    pub data: Vec<u8>,
}

/// A structurally valid response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub control: u8,
    pub address: u8,
    pub control_information: u8,
    pub user_data: Vec<u8>,
    pub checksum: u8,
    /// Whether the received checksum matches the additive sum. Structural
    /// validity and decoding do not depend on it.
    pub checksum_valid: bool,
}

/// Running XOR over all bytes; the command-direction checksum.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Arithmetic sum modulo 256; the response-direction checksum.
pub fn sum_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Packs a command frame into a ready-to-send byte vector.
///
/// Fails with `InvalidParam` if the payload exceeds the frame bound.
pub fn pack_command(frame: &CommandFrame) -> Result<Vec<u8>, AquabusError> {
    if frame.data.len() > METER_MAX_CMD_DATA {
        return Err(AquabusError::InvalidParam(format!(
            "command payload {} exceeds {} bytes",
            frame.data.len(),
            METER_MAX_CMD_DATA
        )));
    }

    let mut out = Vec::with_capacity(frame.data.len() + 4);
    out.push(METER_CMD_START);
    out.push(frame.command);
    out.push(frame.data.len() as u8);
    out.extend_from_slice(&frame.data);
    out.push(xor_checksum(&out));
    Ok(out)
}

/// Uses the `nom` crate to parse the fixed header and L-counted body.
fn parse_response_body(input: &[u8]) -> IResult<&[u8], (u8, u8, u8, &[u8], u8)> {
    let (input, _) = tag(&[METER_RSP_START][..])(input)?;
    let (input, length1) = be_u8(input)?;
    let (input, length2) = be_u8(input)?;
    if length1 != length2 || !(METER_RSP_L_MIN..=METER_RSP_L_MAX).contains(&length1) {
        return Err(NomErr::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let (input, _) = tag(&[METER_RSP_START][..])(input)?;
    let (input, control) = be_u8(input)?;
    let (input, address) = be_u8(input)?;
    let (input, control_information) = be_u8(input)?;
    let (input, user_data) = take(length1 as usize - 3)(input)?;
    let (input, checksum) = be_u8(input)?;
    let (input, _) = tag(&[METER_FRAME_END][..])(input)?;
    Ok((input, (control, address, control_information, user_data, checksum)))
}

/// Parses and structurally validates a complete response frame.
///
/// Structural checks: both sentinels, equal `L` bytes, `L` within the
/// plausible range, and a total length of exactly `4 + L + 2`. The additive
/// checksum is computed but recorded in `checksum_valid` rather than
/// enforced.
pub fn parse_response(raw: &[u8]) -> Result<ResponseFrame, AquabusError> {
    if raw.len() < METER_RSP_L_MIN as usize + METER_RSP_OVERHEAD {
        return Err(AquabusError::InvalidFrame(format!(
            "{} bytes is below the minimum response length",
            raw.len()
        )));
    }

    let (rest, (control, address, control_information, user_data, checksum)) =
        parse_response_body(raw)
            .map_err(|e| AquabusError::InvalidFrame(format!("structural parse failed: {e:?}")))?;
    if !rest.is_empty() {
        return Err(AquabusError::InvalidFrame(format!(
            "{} trailing bytes after end sentinel",
            rest.len()
        )));
    }

    // Sum runs over C, A, CI and UserData: everything the L field counts.
    let calculated = sum_checksum(&raw[4..raw.len() - 2]);

    Ok(ResponseFrame {
        control,
        address,
        control_information,
        user_data: user_data.to_vec(),
        checksum,
        checksum_valid: checksum == calculated,
    })
}

impl ResponseFrame {
    /// The checksum mismatch as an error value, if any.
    pub fn checksum_error(&self) -> Option<AquabusError> {
        if self.checksum_valid {
            return None;
        }
        let mut calculated =
            sum_checksum(&[self.control, self.address, self.control_information]);
        calculated = self
            .user_data
            .iter()
            .fold(calculated, |acc, b| acc.wrapping_add(*b));
        Some(AquabusError::ChecksumMismatch {
            expected: self.checksum,
            calculated,
        })
    }
}
