//! Wall-clock access for services and alert evaluation.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" in epoch milliseconds.
///
/// Alert evaluation samples this once per tick, so every note in a batch is
/// classified against the same instant.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Reads the host system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        now_epoch_ms()
    }
}

/// Current system time in epoch milliseconds.
///
/// Times before the Unix epoch are reported as negative values.
pub fn now_epoch_ms() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
    }
}
