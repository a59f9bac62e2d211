//! # Utility Modules
//!
//! Common utilities used throughout the aquabus-rs crate: the SPSC receive
//! ring, the injectable monotonic clock, hex helpers and rate-limited
//! logging.

pub mod clock;
pub mod hex;
pub mod logging;
pub mod ringbuf;

// Re-export commonly used types and functions
pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use hex::{decode_hex, encode_hex, format_hex_compact, hex_to_bytes};
pub use logging::{log_frame_hex, LogThrottle};
pub use ringbuf::{RingConsumer, RingProducer, SpscRing};
