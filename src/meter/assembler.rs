//! # Receive Assembler
//!
//! Byte-at-a-time reassembly of response frames from the polled receive
//! stream. The line delivers bytes in arbitrary fragments, so the assembler
//! is a small cyclic state machine: it hunts for the start sentinel, collects
//! up to the frame bound, and completes on the end sentinel.
//!
//! Completion is guarded: the end-sentinel value (0x16) can legitimately
//! appear inside the length/header bytes of a frame, so it only terminates
//! collection once more than six bytes are buffered. Anything shorter treats
//! it as ordinary data.

use crate::constants::{
    METER_FRAME_END, METER_MAX_FRAME, METER_RSP_MIN_COLLECTED, METER_RSP_START,
};
use crate::error::AquabusError;
use crate::util::logging::LogThrottle;

/// Assembler states. The machine is cyclic: completion and overflow both
/// land back in `WaitingForStart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    WaitingForStart,
    Collecting,
}

/// What a single fed byte produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Byte consumed, no frame yet.
    Pending,
    /// A full frame was collected; the raw bytes include both sentinels.
    Complete(Vec<u8>),
    /// The frame bound was exceeded; the assembler has reset.
    Overflow(AquabusError),
}

/// Incremental response-frame assembler.
pub struct ReceiveAssembler {
    state: AssemblerState,
    buffer: Vec<u8>,
    discard_throttle: LogThrottle,
}

impl ReceiveAssembler {
    pub fn new() -> Self {
        Self {
            state: AssemblerState::WaitingForStart,
            buffer: Vec::with_capacity(METER_MAX_FRAME),
            // Line noise between exchanges is normal; cap the chatter.
            discard_throttle: LogThrottle::new(1000, 5),
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Bytes buffered so far for the frame in progress.
    pub fn collected(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partial frame and return to hunting for a start sentinel.
    pub fn reset(&mut self) {
        self.state = AssemblerState::WaitingForStart;
        self.buffer.clear();
    }

    /// Feed one byte from the line.
    pub fn feed_byte(&mut self, byte: u8) -> FeedOutcome {
        match self.state {
            AssemblerState::WaitingForStart => {
                if byte == METER_RSP_START {
                    self.buffer.clear();
                    self.buffer.push(byte);
                    self.state = AssemblerState::Collecting;
                } else if self.discard_throttle.allow() {
                    log::debug!("discarding 0x{byte:02x} outside frame");
                }
                FeedOutcome::Pending
            }
            AssemblerState::Collecting => {
                if self.buffer.len() >= METER_MAX_FRAME {
                    let collected = self.buffer.len();
                    self.reset();
                    return FeedOutcome::Overflow(AquabusError::BufferOverflow(collected));
                }
                self.buffer.push(byte);
                if byte == METER_FRAME_END && self.buffer.len() > METER_RSP_MIN_COLLECTED {
                    let frame = std::mem::take(&mut self.buffer);
                    self.reset();
                    FeedOutcome::Complete(frame)
                } else {
                    FeedOutcome::Pending
                }
            }
        }
    }

    /// Feed a fragment; completed frames and overflows come back in order.
    ///
    /// The result is identical for any chunking of the same byte stream.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<FeedOutcome> {
        bytes
            .iter()
            .map(|b| self.feed_byte(*b))
            .filter(|outcome| !matches!(outcome, FeedOutcome::Pending))
            .collect()
    }
}

impl Default for ReceiveAssembler {
    fn default() -> Self {
        Self::new()
    }
}
