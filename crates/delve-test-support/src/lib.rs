//! Shared test doubles for the Delve combat engine.

mod clock;
mod rng;

pub use clock::{FixedClock, fixed_clock};
pub use rng::{MockRng, SequenceRng};
