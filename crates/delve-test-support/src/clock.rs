//! Deterministic `Clock` implementation for tests.

use chrono::{DateTime, TimeZone, Utc};
use delve_core::clock::Clock;

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The timestamp every test in the workspace stamps its events with.
///
/// # Panics
///
/// Never in practice; the date literal is valid.
#[must_use]
pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
}
