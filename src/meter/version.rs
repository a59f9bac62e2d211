//! # Wire-Format Revision Detection
//!
//! Four generations of meter firmware share the same outer frame but pack
//! UserData differently. Revision 1 carries only the 12-byte prefix.
//! Revisions 2 to 4 append a UDF trailer whose first byte is a version tag,
//! but fielded meters exist that omit the tag, so detection falls back to a
//! structural heuristic: revision 4 is the only one that sets the two high
//! bits of the value/decimal byte as status flags.

use crate::constants::{
    METER_OFFSET_VIF, METER_UDF_TAG_V2, METER_UDF_TAG_V3, METER_UDF_TAG_V4, METER_USER_DATA_LEN,
    METER_VIF_FREEZE, METER_VIF_MAGNET,
};
use crate::meter::frame::ResponseFrame;
use serde::{Deserialize, Serialize};

/// The wire-format revision a response frame was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolVersion {
    V1,
    V2,
    V3,
    V4,
    /// Structural validation failed; field decoding must not be attempted.
    Unknown,
}

/// Classifies a structurally valid response frame. First match wins:
///
/// 1. UserData of exactly 12 bytes (no trailer) is revision 1.
/// 2. A known version tag in the first trailer byte names its revision.
/// 3. Either high status bit in the value/decimal byte means revision 4.
/// 4. Anything else defaults to revision 2, the common untagged case.
pub fn detect_version(frame: &ResponseFrame) -> ProtocolVersion {
    let user_data = &frame.user_data;
    if user_data.len() < METER_USER_DATA_LEN {
        return ProtocolVersion::Unknown;
    }
    if user_data.len() == METER_USER_DATA_LEN {
        return ProtocolVersion::V1;
    }

    match user_data[METER_USER_DATA_LEN] {
        METER_UDF_TAG_V2 => return ProtocolVersion::V2,
        METER_UDF_TAG_V3 => return ProtocolVersion::V3,
        METER_UDF_TAG_V4 => return ProtocolVersion::V4,
        _ => {}
    }

    if user_data[METER_OFFSET_VIF] & (METER_VIF_MAGNET | METER_VIF_FREEZE) != 0 {
        return ProtocolVersion::V4;
    }

    ProtocolVersion::V2
}
