//! Time source for record timestamps.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Supplies creation times. Successive calls never go backwards.
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock clamped so that it never runs backwards within a process
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl SystemClock {
    /// Create a new system clock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let Ok(mut last) = self.last.lock() else {
            return now;
        };
        let next = match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        *last = Some(next);
        next
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start at the given instant
    #[must_use]
    pub const fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward; negative durations are ignored
    pub fn advance(&self, by: Duration) {
        if by < Duration::zero() {
            return;
        }
        if let Ok(mut current) = self.current.lock() {
            *current += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.current
            .lock()
            .map_or_else(|_| Utc::now(), |current| *current)
    }
}
