//! Mock transport implementation for testing
//!
//! This module provides a mock transport that can be used to test the
//! protocol engine without requiring actual hardware.

use crate::error::AquabusError;
use crate::meter::transport::MeterTransport;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock transport that simulates bidirectional communication
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Data written to the line (outgoing)
    tx_buffer: Arc<Mutex<Vec<u8>>>,
    /// Data to be read from the line (incoming)
    rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Simulated transmit error
    next_error: Arc<Mutex<Option<AquabusError>>>,
    /// Receiver gate state
    receiver_enabled: Arc<Mutex<bool>>,
    /// Number of transmit calls observed
    transmit_count: Arc<Mutex<u32>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            receiver_enabled: Arc::new(Mutex::new(true)),
            ..Self::default()
        }
    }

    /// Queue data to be read from the line
    pub fn queue_rx_data(&self, data: &[u8]) {
        if *self.receiver_enabled.lock().unwrap() {
            self.rx_buffer.lock().unwrap().extend(data);
        }
    }

    /// Get data that was written to the line
    pub fn get_tx_data(&self) -> Vec<u8> {
        self.tx_buffer.lock().unwrap().clone()
    }

    /// Number of transmit calls performed so far
    pub fn transmit_count(&self) -> u32 {
        *self.transmit_count.lock().unwrap()
    }

    /// Clear all buffers
    pub fn clear(&self) {
        self.tx_buffer.lock().unwrap().clear();
        self.rx_buffer.lock().unwrap().clear();
    }

    /// Set an error to be returned on the next transmit
    pub fn set_next_error(&self, error: AquabusError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Whether the engine currently has the receiver enabled
    pub fn receiver_enabled(&self) -> bool {
        *self.receiver_enabled.lock().unwrap()
    }
}

#[async_trait]
impl MeterTransport for MockTransport {
    async fn transmit(&mut self, data: &[u8]) -> Result<usize, AquabusError> {
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }
        *self.transmit_count.lock().unwrap() += 1;
        self.tx_buffer.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> usize {
        let mut rx = self.rx_buffer.lock().unwrap();
        let mut read = 0;
        while read < buf.len() {
            match rx.pop_front() {
                Some(byte) => {
                    buf[read] = byte;
                    read += 1;
                }
                None => break,
            }
        }
        read
    }

    fn set_receiver_enabled(&mut self, enabled: bool) {
        *self.receiver_enabled.lock().unwrap() = enabled;
    }

    fn discard_pending(&mut self) {
        self.rx_buffer.lock().unwrap().clear();
    }
}
