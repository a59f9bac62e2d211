//! # SPSC Receive Ring
//!
//! Fixed-capacity single-producer/single-consumer byte queue used between
//! the serial reader (producer) and the engine's polled task (consumer).
//!
//! Capacity is a power of two and indices are masked rather than divided, so
//! head/tail comparisons stay branch-cheap. Correctness relies only on the
//! SPSC discipline: the producer advances `head` after writing a slot, the
//! consumer advances `tail` after reading one, and nothing else writes either
//! index. There is deliberately no mutex on the data path.
//!
//! ## Usage
//!
//! ```rust
//! use aquabus_rs::util::SpscRing;
//!
//! let (mut tx, mut rx) = SpscRing::with_capacity(8);
//! assert_eq!(tx.push_slice(&[0x68, 0x0F]), 2);
//!
//! let mut buf = [0u8; 4];
//! assert_eq!(rx.pop_slice(&mut buf), 2);
//! assert_eq!(&buf[..2], &[0x68, 0x0F]);
//! ```

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

struct Shared {
    slots: Box<[AtomicU8]>,
    mask: usize,
    head: AtomicUsize,
    tail: AtomicUsize,
}

/// Handle pair factory for the ring.
pub struct SpscRing;

impl SpscRing {
    /// Create a ring and split it into its producer and consumer halves.
    ///
    /// `capacity` must be a power of two; one slot is kept empty to
    /// distinguish full from empty, so the usable depth is `capacity - 1`.
    pub fn with_capacity(capacity: usize) -> (RingProducer, RingConsumer) {
        assert!(
            capacity.is_power_of_two() && capacity >= 2,
            "ring capacity must be a power of two"
        );
        let slots = (0..capacity).map(|_| AtomicU8::new(0)).collect();
        let shared = Arc::new(Shared {
            slots,
            mask: capacity - 1,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        });
        (
            RingProducer {
                shared: Arc::clone(&shared),
            },
            RingConsumer { shared },
        )
    }
}

/// Writing half; owned by the receive side feeding bytes off the line.
pub struct RingProducer {
    shared: Arc<Shared>,
}

impl RingProducer {
    /// Append one byte. Returns false if the ring is full (byte dropped).
    pub fn push(&mut self, byte: u8) -> bool {
        let head = self.shared.head.load(Ordering::Relaxed);
        let tail = self.shared.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) >= self.shared.mask {
            return false;
        }
        self.shared.slots[head & self.shared.mask].store(byte, Ordering::Relaxed);
        self.shared.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Append as much of `data` as fits; returns the number accepted.
    pub fn push_slice(&mut self, data: &[u8]) -> usize {
        let mut written = 0;
        for &byte in data {
            if !self.push(byte) {
                break;
            }
            written += 1;
        }
        written
    }

    /// Bytes currently queued.
    pub fn len(&self) -> usize {
        let head = self.shared.head.load(Ordering::Acquire);
        let tail = self.shared.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reading half; owned by the polled consumer.
pub struct RingConsumer {
    shared: Arc<Shared>,
}

impl RingConsumer {
    /// Remove one byte, if any is queued.
    pub fn pop(&mut self) -> Option<u8> {
        let tail = self.shared.tail.load(Ordering::Relaxed);
        let head = self.shared.head.load(Ordering::Acquire);
        if tail == head {
            return None;
        }
        let byte = self.shared.slots[tail & self.shared.mask].load(Ordering::Relaxed);
        self.shared.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Drain up to `buf.len()` bytes into `buf`; returns the count moved.
    pub fn pop_slice(&mut self, buf: &mut [u8]) -> usize {
        let mut read = 0;
        while read < buf.len() {
            match self.pop() {
                Some(byte) => {
                    buf[read] = byte;
                    read += 1;
                }
                None => break,
            }
        }
        read
    }

    /// Discard everything currently queued; returns the count dropped.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.pop().is_some() {
            dropped += 1;
        }
        dropped
    }

    /// Bytes currently queued.
    pub fn len(&self) -> usize {
        let head = self.shared.head.load(Ordering::Acquire);
        let tail = self.shared.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
