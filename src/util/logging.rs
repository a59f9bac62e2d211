//! # Receive-Path Logging Utilities
//!
//! Rate-limited logging for the byte-oriented receive path, where line noise
//! can otherwise flood the log at every poll, plus a frame hex-dump helper.

use crate::util::hex::format_hex_compact;
use std::time::Instant;

/// Throttling structure for rate-limiting log messages
///
/// Allows at most `cap` messages per `window_ms` window; the counter resets
/// when the window expires.
#[derive(Debug)]
pub struct LogThrottle {
    window_ms: u64,
    cap: u32,
    count: u32,
    t0: Instant,
}

impl LogThrottle {
    /// Create new throttle with time window and message cap
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            t0: Instant::now(),
        }
    }

    /// Check if logging is allowed (resets counter after window expires)
    pub fn allow(&mut self) -> bool {
        let elapsed = self.t0.elapsed().as_millis() as u64;
        if elapsed >= self.window_ms {
            self.t0 = Instant::now();
            self.count = 0;
        }
        if self.count < self.cap {
            self.count += 1;
            true
        } else {
            false
        }
    }
}

/// Log a frame as a compact hex dump at debug level.
pub fn log_frame_hex(label: &str, data: &[u8]) {
    log::debug!("{label}: {}", format_hex_compact(data));
}
