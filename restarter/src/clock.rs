//! Wall-clock sources for the scheduler.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock pinned to a fixed origin that advances with tokio's clock.
///
/// When the tokio clock is paused (tests), wall time moves exactly as far as
/// the runtime auto-advances, so timers and `now()` never disagree.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    origin: DateTime<Utc>,
    started: Instant,
}

impl AnchoredClock {
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            started: Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Instant::now().saturating_duration_since(self.started);
        match chrono::Duration::from_std(elapsed) {
            Ok(elapsed) => self.origin + elapsed,
            Err(_) => self.origin,
        }
    }
}
