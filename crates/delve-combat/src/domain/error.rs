//! Combat rule violations.
//!
//! Every variant is recoverable: the action is rejected and the session is
//! left exactly as it was before the call.

use thiserror::Error;
use uuid::Uuid;

/// Why a combat operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// The session could not be created from the given combatants.
    #[error("invalid session setup: {0}")]
    InvalidSetup(String),

    /// The acting combatant is not part of this session.
    #[error("combatant {0} is not part of this session")]
    UnknownCombatant(Uuid),

    /// The target is absent, no longer active, or the actor itself.
    #[error("target {0} is not a valid target")]
    InvalidTarget(Uuid),

    /// Push was attempted without enough momentum.
    #[error("insufficient momentum: {required} required, {available} available")]
    InsufficientMomentum {
        /// Momentum needed.
        required: u32,
        /// Momentum held.
        available: u32,
    },

    /// The actor has been defeated or has escaped.
    #[error("combatant {0} is no longer in the fight")]
    ActionOnDefeatedActor(Uuid),

    /// Someone other than the current combatant tried to act.
    #[error("it is not {actor}'s turn; waiting on {expected}")]
    NotYourTurn {
        /// Who tried to act.
        actor: Uuid,
        /// Whose turn it is.
        expected: Uuid,
    },

    /// The session has already reached a terminal outcome.
    #[error("the combat session is over")]
    SessionOver,

    /// Decline was used while no bonus action was pending.
    #[error("there is no bonus action to decline")]
    NoBonusActionPending,

    /// Push was used past the per-turn safety ceiling.
    #[error("bonus action limit of {limit} per turn reached")]
    BonusActionLimitReached {
        /// The configured ceiling.
        limit: u32,
    },
}
