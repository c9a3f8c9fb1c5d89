//! Clock abstraction for determinism.

use chrono::{DateTime, Utc};

/// Source of event timestamps. Combat rules never read the clock; it only
/// stamps transcript events.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
