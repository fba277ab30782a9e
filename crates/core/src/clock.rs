//! Time sources for stamping job transitions.

use chrono::Utc;

use crate::types::Timestamp;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Wall clock anchored to tokio's monotonic timer.
///
/// Elapsed time is measured with [`tokio::time::Instant`], so under a paused
/// runtime (`#[tokio::test(start_paused = true)]`) timestamps advance in step
/// with the virtual timer and scheduled transitions stay deterministic.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Timestamp,
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Utc::now(),
            started: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        match chrono::Duration::from_std(self.started.elapsed()) {
            Ok(elapsed) => self.origin + elapsed,
            Err(_) => Utc::now(),
        }
    }
}
