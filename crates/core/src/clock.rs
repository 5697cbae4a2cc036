//! Time abstraction so scheduling and ETC math can be tested deterministically.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time for the orchestrator.
///
/// Every component that needs "now" (timeout deadlines, ETC estimates, log
/// timestamps) takes a `Clock` instead of calling `SystemTime::now()` directly,
/// so tests can advance time deterministically instead of sleeping.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64;

    /// Seconds since the Unix epoch, as a float, for ETC/budget arithmetic.
    fn epoch_secs(&self) -> f64 {
        self.epoch_ms() as f64 / 1000.0
    }
}

/// Real wall-clock implementation.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Controllable clock for tests.
#[derive(Clone, Default)]
pub struct FakeClock {
    now_ms: Arc<Mutex<u64>>,
}

impl FakeClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(Mutex::new(start_ms)),
        }
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        *self.now_ms.lock() += delta_ms;
    }

    pub fn advance_secs(&self, delta_secs: f64) {
        self.advance_ms((delta_secs * 1000.0) as u64);
    }

    pub fn set_ms(&self, ms: u64) {
        *self.now_ms.lock() = ms;
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        *self.now_ms.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
