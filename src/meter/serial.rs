//! # Meter Serial Communication
//!
//! Serial transport for the meter link and the high-level device handle.
//! The meter talks 1200 bit/s, 8 data bits, no parity, 1 stop bit.
//!
//! A background reader task is the sole producer into the SPSC receive ring;
//! the engine's polled `task()` is the sole consumer. Gating the receiver
//! drops bytes at the producer, mirroring the receive-interrupt enable of
//! the original line discipline.

use crate::constants::{
    METER_CMD_READ, METER_MAX_RETRY, METER_RX_RING_CAPACITY, METER_TASK_INTERVAL_MS,
};
use crate::error::AquabusError;
use crate::meter::engine::{EngineState, ProtocolEngine};
use crate::meter::transport::MeterTransport;
use crate::payload::decode::MeterReading;
use crate::util::clock::SystemClock;
use crate::util::ringbuf::{RingConsumer, SpscRing};
use async_trait::async_trait;
use bytes::BytesMut;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, WriteHalf};
use tokio_serial::SerialPortBuilderExt;

/// Configuration for serial connection.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baudrate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig { baudrate: 1200 }
    }
}

/// Serial-port-backed [`MeterTransport`].
pub struct SerialTransport {
    writer: WriteHalf<tokio_serial::SerialStream>,
    rx: RingConsumer,
    receiver_enabled: Arc<AtomicBool>,
    reader: tokio::task::JoinHandle<()>,
}

impl SerialTransport {
    /// Opens the port at the meter's line settings and spawns the reader
    /// task feeding the receive ring.
    pub async fn open(port_name: &str, config: SerialConfig) -> Result<Self, AquabusError> {
        let port = tokio_serial::new(port_name, config.baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .open_native_async()
            .map_err(|e| AquabusError::SerialPortError(e.to_string()))?;

        let (mut read_half, writer) = tokio::io::split(port);
        let (mut ring_tx, ring_rx) = SpscRing::with_capacity(METER_RX_RING_CAPACITY);
        let receiver_enabled = Arc::new(AtomicBool::new(true));
        let gate = Arc::clone(&receiver_enabled);

        let reader = tokio::spawn(async move {
            let mut staging = BytesMut::with_capacity(METER_RX_RING_CAPACITY);
            loop {
                staging.clear();
                match read_half.read_buf(&mut staging).await {
                    Ok(0) => break,
                    Ok(_) => {
                        if gate.load(Ordering::Acquire) {
                            let accepted = ring_tx.push_slice(&staging);
                            if accepted < staging.len() {
                                log::warn!(
                                    "receive ring full, dropped {} bytes",
                                    staging.len() - accepted
                                );
                            }
                        }
                    }
                    Err(e) => {
                        log::error!("serial read failed: {e}");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            writer,
            rx: ring_rx,
            receiver_enabled,
            reader,
        })
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl MeterTransport for SerialTransport {
    async fn transmit(&mut self, data: &[u8]) -> Result<usize, AquabusError> {
        self.writer
            .write_all(data)
            .await
            .map_err(|e| AquabusError::SerialPortError(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| AquabusError::SerialPortError(e.to_string()))?;
        Ok(data.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> usize {
        self.rx.pop_slice(buf)
    }

    fn set_receiver_enabled(&mut self, enabled: bool) {
        self.receiver_enabled.store(enabled, Ordering::Release);
    }

    fn discard_pending(&mut self) {
        let dropped = self.rx.drain();
        if dropped > 0 {
            log::debug!("discarded {dropped} stale receive bytes");
        }
    }
}

/// Represents a handle to a connected meter, wrapping the protocol engine
/// over a serial transport.
pub struct MeterDeviceHandle {
    engine: ProtocolEngine<SerialTransport, SystemClock>,
}

impl MeterDeviceHandle {
    /// Establishes a connection using the default 1200 8N1 settings.
    pub async fn connect(port_name: &str) -> Result<MeterDeviceHandle, AquabusError> {
        Self::connect_with_config(port_name, SerialConfig::default()).await
    }

    /// Establishes a connection with custom config.
    pub async fn connect_with_config(
        port_name: &str,
        config: SerialConfig,
    ) -> Result<MeterDeviceHandle, AquabusError> {
        let transport = SerialTransport::open(port_name, config).await?;
        Ok(MeterDeviceHandle {
            engine: ProtocolEngine::new(transport, SystemClock::new()),
        })
    }

    /// Access the underlying engine, e.g. to register sinks.
    pub fn engine(&mut self) -> &mut ProtocolEngine<SerialTransport, SystemClock> {
        &mut self.engine
    }

    /// One full read exchange: send the read command, poll the engine on
    /// its task cadence until the exchange settles, and return the decoded
    /// reading or the error that ended it.
    pub async fn read_meter(&mut self, address: u8) -> Result<MeterReading, AquabusError> {
        self.engine
            .send_command(address, METER_CMD_READ, &[])
            .await?;

        loop {
            self.engine.task().await;
            if self.engine.state() == EngineState::Idle {
                if let Some(reading) = self.engine.take_reading() {
                    return Ok(reading);
                }
                return Err(self
                    .engine
                    .last_error()
                    .cloned()
                    .unwrap_or(AquabusError::Timeout {
                        attempt: METER_MAX_RETRY,
                        max: METER_MAX_RETRY,
                    }));
            }
            tokio::time::sleep(Duration::from_millis(METER_TASK_INTERVAL_MS)).await;
        }
    }
}
