//! Time sources
//!
//! Lock timing uses a monotonic instant; record timestamps use wall-clock
//! UTC. Both come from the same [`Clock`] so tests can drive them together.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Source of monotonic and wall-clock time
pub trait Clock: Send + Sync {
    /// Monotonic now
    fn now(&self) -> Instant;

    /// Wall-clock now
    fn wall_now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    wall_base: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Start at the current system time
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Start at a fixed wall-clock time
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            base: Instant::now(),
            wall_base: wall,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move both clocks forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Time elapsed since construction
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        let offset = *self.offset.lock();
        // Offsets beyond chrono's range never occur in practice; saturate at the base.
        match chrono::Duration::from_std(offset) {
            Ok(d) => self.wall_base + d,
            Err(_) => self.wall_base,
        }
    }
}
