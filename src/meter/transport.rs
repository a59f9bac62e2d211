//! # Transport Contract
//!
//! The engine consumes a byte-oriented transport and nothing else: it can
//! send a buffer, drain received bytes without blocking, gate the receiver
//! and flush stale bytes. Real serial ports and the test mock implement the
//! same trait so the engine is testable without hardware.

use crate::error::AquabusError;
use async_trait::async_trait;

/// Byte transport the protocol engine drives.
#[async_trait]
pub trait MeterTransport: Send {
    /// Send the whole buffer, blocking until it is on the wire.
    /// Returns the number of bytes sent.
    async fn transmit(&mut self, data: &[u8]) -> Result<usize, AquabusError>;

    /// Drain up to `buf.len()` already-received bytes without blocking.
    /// Returns the number of bytes moved into `buf`.
    fn receive(&mut self, buf: &mut [u8]) -> usize;

    /// Gate the receive side. While disabled, incoming bytes are dropped so
    /// a half-received frame cannot interleave with a fresh exchange.
    fn set_receiver_enabled(&mut self, enabled: bool);

    /// Discard everything received but not yet drained.
    fn discard_pending(&mut self);
}
