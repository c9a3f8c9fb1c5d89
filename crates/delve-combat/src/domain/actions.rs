//! Actions a combatant can take and the structured results they produce.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attribute::Attribute;
use super::combatant::StatusEffect;
use super::session::SessionOutcome;

/// A structured action, already parsed and with its target resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Contest `attribute` against the target's defending attribute.
    Attack {
        /// Defender.
        target: Uuid,
        /// Offensive attribute.
        attribute: Attribute,
    },
    /// Gain advantage on defense until the start of the next own turn.
    Evade,
    /// Spend momentum for one more action this turn.
    Push,
    /// Attempt to leave the fight at the start of the next own turn.
    Escape,
    /// Give up a pending bonus action.
    Decline,
}

impl Action {
    /// Lowercase name as used by the command gateway.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::Attack { .. } => "attack",
            Action::Evade => "evade",
            Action::Push => "push",
            Action::Escape => "escape",
            Action::Decline => "decline",
        }
    }
}

/// What a resolved attack did. Exactly one variant per attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttackEffect {
    /// Attacker won; the defender took damage.
    Damage {
        /// Damage dealt.
        amount: u32,
    },
    /// Defender won; the defender gained momentum.
    Momentum {
        /// Momentum gained.
        amount: u32,
    },
    /// Equal totals.
    Tie,
}

/// Dice and totals of one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Attacker.
    pub attacker_id: Uuid,
    /// Defender.
    pub defender_id: Uuid,
    /// Offensive attribute.
    pub attribute: Attribute,
    /// Attribute the defender rolled with.
    pub defending_attribute: Attribute,
    /// Attacker's die face.
    pub attacker_roll: u32,
    /// Attacker's die plus score.
    pub attacker_total: u32,
    /// Defender's die faces; two when the defender was evading.
    pub defender_rolls: Vec<u32>,
    /// Defender's kept die plus score.
    pub defender_total: u32,
    /// Whether the defender's Evading was consumed by this roll.
    pub evaded: bool,
    /// Damage, momentum, or nothing.
    pub effect: AttackEffect,
}

impl AttackOutcome {
    /// Damage dealt, zero unless the attacker won.
    #[must_use]
    pub fn damage(&self) -> u32 {
        match self.effect {
            AttackEffect::Damage { amount } => amount,
            _ => 0,
        }
    }

    /// Momentum gained by the defender, zero unless the defender won.
    #[must_use]
    pub fn momentum_gained(&self) -> u32 {
        match self.effect {
            AttackEffect::Momentum { amount } => amount,
            _ => 0,
        }
    }
}

/// Action-specific part of a turn result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// An attack was rolled.
    Attack(AttackOutcome),
    /// Evading was applied or refreshed.
    Evade,
    /// Momentum was spent for a bonus action.
    Push {
        /// Momentum spent.
        momentum_spent: u32,
        /// Momentum left afterwards.
        momentum_remaining: u32,
    },
    /// Escaping was applied or refreshed.
    Escape,
    /// A pending bonus action was given up.
    Decline,
}

impl ActionOutcome {
    /// Name of the action that produced this outcome.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ActionOutcome::Attack(_) => "attack",
            ActionOutcome::Evade => "evade",
            ActionOutcome::Push { .. } => "push",
            ActionOutcome::Escape => "escape",
            ActionOutcome::Decline => "decline",
        }
    }
}

/// How a status changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChangeKind {
    /// Newly applied.
    Applied,
    /// Already active; its stamp was renewed.
    Refreshed,
    /// Used up by an incoming attack.
    Consumed,
    /// Broken by a successful hit.
    Cancelled,
    /// Ran out at a turn boundary.
    Expired,
}

/// One status transition on one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Whose status changed.
    pub combatant_id: Uuid,
    /// Which status.
    pub effect: StatusEffect,
    /// How it changed.
    pub change: StatusChangeKind,
}

/// Why a combatant left the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Damage reached the defeat threshold.
    Defeated,
    /// Escaping survived to the turn boundary.
    Escaped,
}

/// A combatant leaving the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    /// Who left.
    pub combatant_id: Uuid,
    /// Why.
    pub reason: RemovalReason,
}

/// Everything one `take_turn` call did, for display by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Session the action belongs to.
    pub session_id: Uuid,
    /// Turn number on which the action was taken.
    pub turn: u64,
    /// Who acted.
    pub actor_id: Uuid,
    /// What the action did.
    pub outcome: ActionOutcome,
    /// Status transitions, in the order they happened.
    pub status_changes: Vec<StatusChange>,
    /// Combatants that left the session.
    pub removals: Vec<Removal>,
    /// Whose turn it is now; `None` once the session is over.
    pub next_actor: Option<Uuid>,
    /// The actor still owes a bonus action from Push.
    pub bonus_action_pending: bool,
    /// Session outcome after this action.
    pub session_outcome: SessionOutcome,
}

impl TurnResult {
    /// The attack details, if the action was an attack.
    #[must_use]
    pub fn attack(&self) -> Option<&AttackOutcome> {
        match &self.outcome {
            ActionOutcome::Attack(outcome) => Some(outcome),
            _ => None,
        }
    }
}
