//! Deterministic `DeterministicRng` implementations for tests.

use delve_core::rng::DeterministicRng;

/// An RNG that always returns `min` for `next_u32_range` and `0.0` for
/// `next_f64`. Every d6 it rolls is a 1.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// An RNG that returns values from a predetermined sequence, in order.
/// Used to script die faces: an attack consumes the attacker's die first,
/// then one defender die (two while the defender is evading).
///
/// Panics if the sequence is exhausted, which in a test means an action
/// rolled more dice than the scenario expected.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }

    /// Number of scripted values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len() - self.index
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}
