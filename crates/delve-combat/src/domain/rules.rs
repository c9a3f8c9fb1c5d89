//! Tunable combat rules.

use serde::{Deserialize, Serialize};

/// Momentum spent by one Push.
pub const PUSH_MOMENTUM_COST: u32 = 5;

/// Faces on the combat die.
pub const DIE_FACES: u32 = 6;

/// Highest attribute score a combatant may enter a session with.
pub const MAX_ATTRIBUTE_SCORE: u32 = 100;

/// Valid health ratings.
pub const HEALTH_RATINGS: std::ops::RangeInclusive<u32> = 1..=10;

/// Session-wide rule settings, loaded from the `combat` section of the
/// server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CombatRules {
    /// Defeat threshold for combatants created without one.
    pub default_defeat_threshold: u32,
    /// Most Pushes one combatant may chain in a single turn.
    pub max_bonus_actions: u32,
    /// Optional turn limit after which the session ends without a victor.
    pub max_turns: Option<u64>,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            default_defeat_threshold: 10,
            max_bonus_actions: 8,
            max_turns: None,
        }
    }
}

/// Defeat threshold for a health rating. Ratings outside
/// [`HEALTH_RATINGS`] are rejected when a session is created.
#[must_use]
pub fn defeat_threshold_for_rating(rating: u32) -> u32 {
    rating.saturating_mul(2).saturating_add(2)
}
