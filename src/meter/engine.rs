//! # Protocol Engine
//!
//! Orchestrates a single command/response exchange with the meter: preamble
//! hold, blocking transmit, deadline-armed wait, bounded retransmission and
//! delivery of the decoded reading through the registered sinks.
//!
//! The engine owns all exchange state explicitly and is generic over its
//! transport and clock, so it can be instantiated freely and tested without
//! hardware or real time. It is demand-driven: nothing happens between
//! [`ProtocolEngine::task`] calls, and a host that stops polling simply
//! leaves the engine waiting.
//!
//! `Preamble`, `Transmitting`, `Complete` and `Error` are transient: the
//! context resets to `Idle` after each completed or abandoned exchange, so a
//! polling host observes `Idle` or `WaitingForResponse`.

use crate::constants::{
    METER_MAX_RETRY, METER_NAK, METER_PREAMBLE_MS, METER_RESPONSE_TIMEOUT_MS,
};
use crate::error::AquabusError;
use crate::meter::assembler::{AssemblerState, FeedOutcome, ReceiveAssembler};
use crate::meter::frame::{pack_command, parse_response, CommandFrame};
use crate::meter::transport::MeterTransport;
use crate::payload::decode::{decode_reading, MeterReading};
use crate::util::clock::MonotonicClock;
use crate::util::logging::log_frame_hex;
use std::time::Duration;

/// States of the exchange state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Preamble,
    Transmitting,
    WaitingForResponse,
    Complete,
    Error,
}

/// Receives each decoded response. Registered once, fired at most once per
/// completed frame.
pub trait ResponseSink: Send {
    fn on_response(&mut self, reading: &MeterReading);
}

impl<F: FnMut(&MeterReading) + Send> ResponseSink for F {
    fn on_response(&mut self, reading: &MeterReading) {
        self(reading)
    }
}

/// Receives each link error. Registered once, fired at most once per event.
pub trait ErrorSink: Send {
    fn on_error(&mut self, error: &AquabusError);
}

impl<F: FnMut(&AquabusError) + Send> ErrorSink for F {
    fn on_error(&mut self, error: &AquabusError) {
        self(error)
    }
}

/// The exchange state machine. One outstanding exchange at a time; not
/// reentrant.
pub struct ProtocolEngine<T: MeterTransport, C: MonotonicClock> {
    transport: T,
    clock: C,
    state: EngineState,
    assembler: ReceiveAssembler,
    /// Last packed command, kept for retransmission on timeout.
    tx_frame: Vec<u8>,
    /// Transmissions performed for the current exchange.
    retries: u8,
    deadline_ms: u64,
    last_error: Option<AquabusError>,
    last_reading: Option<MeterReading>,
    response_sink: Option<Box<dyn ResponseSink>>,
    error_sink: Option<Box<dyn ErrorSink>>,
}

impl<T: MeterTransport, C: MonotonicClock> ProtocolEngine<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            state: EngineState::Idle,
            assembler: ReceiveAssembler::new(),
            tx_frame: Vec::new(),
            retries: 0,
            deadline_ms: 0,
            last_error: None,
            last_reading: None,
            response_sink: None,
            error_sink: None,
        }
    }

    /// Register the response sink. Replaces any previous registration.
    pub fn set_response_sink(&mut self, sink: Box<dyn ResponseSink>) {
        self.response_sink = Some(sink);
    }

    /// Register the error sink. Replaces any previous registration.
    pub fn set_error_sink(&mut self, sink: Box<dyn ErrorSink>) {
        self.error_sink = Some(sink);
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The most recent error, kept until the next exchange starts.
    pub fn last_error(&self) -> Option<&AquabusError> {
        self.last_error.as_ref()
    }

    /// Take the reading produced by the last completed exchange.
    pub fn take_reading(&mut self) -> Option<MeterReading> {
        self.last_reading.take()
    }

    /// Abort anything in flight and return to `Idle`.
    pub fn reset(&mut self) {
        self.assembler.reset();
        self.transport.discard_pending();
        self.transport.set_receiver_enabled(true);
        self.tx_frame.clear();
        self.retries = 0;
        self.state = EngineState::Idle;
    }

    /// Start an exchange: pack the command, hold the wake-up preamble,
    /// transmit, and arm the response deadline.
    ///
    /// Only accepted from `Idle`; a busy engine rejects the call with
    /// `InvalidParam` and performs no transmission.
    pub async fn send_command(
        &mut self,
        address: u8,
        command: u8,
        data: &[u8],
    ) -> Result<(), AquabusError> {
        if self.state != EngineState::Idle {
            let err = AquabusError::InvalidParam(format!(
                "send_command while {:?}; one exchange may be outstanding",
                self.state
            ));
            self.report_error(&err);
            return Err(err);
        }

        let frame = CommandFrame {
            command,
            address,
            data: data.to_vec(),
        };
        let packed = match pack_command(&frame) {
            Ok(packed) => packed,
            Err(err) => {
                self.report_error(&err);
                return Err(err);
            }
        };

        self.tx_frame = packed;
        self.last_error = None;
        self.last_reading = None;
        self.retries = 0;
        self.assembler.reset();
        self.transmit_stored().await
    }

    /// Periodic poll: drain newly received bytes into the assembler and
    /// check the response deadline. Must be called on a regular cadence;
    /// timeout and retry are resolved only here.
    pub async fn task(&mut self) {
        let mut buf = [0u8; 32];
        loop {
            let drained = self.transport.receive(&mut buf);
            if drained == 0 {
                break;
            }
            for &byte in &buf[..drained] {
                self.process_byte(byte);
            }
        }

        if self.state == EngineState::WaitingForResponse
            && self.clock.now_ms() >= self.deadline_ms
        {
            let err = AquabusError::Timeout {
                attempt: self.retries,
                max: METER_MAX_RETRY,
            };
            self.report_error(&err);
            if self.retries < METER_MAX_RETRY {
                log::debug!("response timeout, retransmitting");
                // A transmit failure inside the retry already settles the
                // engine; nothing further to resolve here.
                let _ = self.transmit_stored().await;
            } else {
                log::warn!("exchange abandoned after {} attempts", self.retries);
                self.settle(EngineState::Error);
            }
        }
    }

    /// Preamble, blocking transmit, deadline arm. The receiver is gated and
    /// flushed first so a half-received frame cannot corrupt the exchange.
    async fn transmit_stored(&mut self) -> Result<(), AquabusError> {
        self.state = EngineState::Preamble;
        self.transport.set_receiver_enabled(false);
        self.transport.discard_pending();
        self.assembler.reset();
        tokio::time::sleep(Duration::from_millis(METER_PREAMBLE_MS)).await;

        self.state = EngineState::Transmitting;
        let result = self.transport.transmit(&self.tx_frame).await;
        self.transport.set_receiver_enabled(true);

        match result {
            Ok(_) => {
                self.retries += 1;
                self.deadline_ms = self.clock.now_ms() + METER_RESPONSE_TIMEOUT_MS;
                self.state = EngineState::WaitingForResponse;
                Ok(())
            }
            Err(err) => {
                self.report_error(&err);
                self.settle(EngineState::Error);
                Err(err)
            }
        }
    }

    fn process_byte(&mut self, byte: u8) {
        // A lone NAK instead of a frame aborts the exchange; it only counts
        // while nothing has been assembled yet, since 0x15 is also a valid
        // payload byte inside a frame.
        if self.state == EngineState::WaitingForResponse
            && byte == METER_NAK
            && self.assembler.state() == AssemblerState::WaitingForStart
        {
            self.report_error(&AquabusError::NakReceived);
            self.settle(EngineState::Error);
            return;
        }

        match self.assembler.feed_byte(byte) {
            FeedOutcome::Pending => {}
            FeedOutcome::Overflow(err) => {
                self.report_error(&err);
                if self.state == EngineState::WaitingForResponse {
                    self.settle(EngineState::Error);
                }
            }
            FeedOutcome::Complete(raw) => self.handle_frame(&raw),
        }
    }

    fn handle_frame(&mut self, raw: &[u8]) {
        log_frame_hex("meter response", raw);

        let frame = match parse_response(raw) {
            Ok(frame) => frame,
            Err(err) => {
                self.report_error(&err);
                if self.state == EngineState::WaitingForResponse {
                    self.settle(EngineState::Error);
                }
                return;
            }
        };

        // A checksum mismatch is reported but does not suppress decoding.
        if let Some(err) = frame.checksum_error() {
            self.report_error(&err);
        }

        match decode_reading(&frame) {
            Ok(reading) => {
                self.last_reading = Some(reading.clone());
                if let Some(sink) = self.response_sink.as_mut() {
                    sink.on_response(&reading);
                }
                if self.state == EngineState::WaitingForResponse {
                    self.settle(EngineState::Complete);
                }
            }
            Err(err) => {
                self.report_error(&err);
                if self.state == EngineState::WaitingForResponse {
                    self.settle(EngineState::Error);
                }
            }
        }
    }

    /// Record the error and fire the sink once.
    fn report_error(&mut self, err: &AquabusError) {
        self.last_error = Some(err.clone());
        if let Some(sink) = self.error_sink.as_mut() {
            sink.on_error(err);
        }
    }

    /// Leave the terminal state and reset the context to `Idle`.
    fn settle(&mut self, terminal: EngineState) {
        log::trace!("exchange settled via {terminal:?}");
        self.retries = 0;
        self.state = EngineState::Idle;
    }
}
