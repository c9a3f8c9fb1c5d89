//! Action resolution: dice, the attribute triangle, and state deltas.
//!
//! Each resolver validates its preconditions before it touches any state, so
//! a rejected action never leaves a partial effect behind.

use delve_core::rng::DeterministicRng;
use tracing::debug;

use super::actions::{
    ActionOutcome, AttackEffect, AttackOutcome, Removal, RemovalReason, StatusChange,
    StatusChangeKind,
};
use super::attribute::{Attribute, defending_attribute};
use super::combatant::{Combatant, StatusEffect};
use super::error::CombatError;
use super::rules::{DIE_FACES, PUSH_MOMENTUM_COST};

/// Effects of one resolved action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Action-specific outcome.
    pub outcome: ActionOutcome,
    /// Status transitions caused by the action.
    pub status_changes: Vec<StatusChange>,
    /// Combatants removed by the action.
    pub removals: Vec<Removal>,
}

impl Resolved {
    pub(crate) fn new(outcome: ActionOutcome) -> Self {
        Self {
            outcome,
            status_changes: Vec::new(),
            removals: Vec::new(),
        }
    }
}

/// Rolls one combat die.
pub fn roll_die(rng: &mut dyn DeterministicRng) -> u32 {
    rng.next_u32_range(1, DIE_FACES)
}

/// Rolls a defense die. With `advantage`, rolls two and keeps the higher.
/// Returns every face rolled and the kept face.
pub fn roll_defense(rng: &mut dyn DeterministicRng, advantage: bool) -> (Vec<u32>, u32) {
    let first = roll_die(rng);
    if !advantage {
        return (vec![first], first);
    }
    let second = roll_die(rng);
    (vec![first, second], first.max(second))
}

fn ensure_alive(actor: &Combatant) -> Result<(), CombatError> {
    if actor.is_alive() {
        Ok(())
    } else {
        Err(CombatError::ActionOnDefeatedActor(actor.id()))
    }
}

/// Resolves an attack of `attacker` on `defender` with `attribute`.
///
/// The attacker rolls one die plus its `attribute` score; the defender rolls
/// plus the score of the triangle's defending attribute, with advantage while
/// evading. A higher attack deals the difference as damage and breaks
/// Escaping; a higher defense grants the difference as momentum.
///
/// # Errors
///
/// Returns `CombatError::ActionOnDefeatedActor` if the attacker is out of the
/// fight, and `CombatError::InvalidTarget` if the defender is out of the fight
/// or is the attacker.
pub fn attack(
    attacker: &Combatant,
    defender: &mut Combatant,
    attribute: Attribute,
    rng: &mut dyn DeterministicRng,
) -> Result<Resolved, CombatError> {
    ensure_alive(attacker)?;
    if !defender.is_alive() || defender.id() == attacker.id() {
        return Err(CombatError::InvalidTarget(defender.id()));
    }

    let defense = defending_attribute(attribute);
    let evading = defender.has_status(StatusEffect::Evading);

    let attacker_roll = roll_die(rng);
    let attacker_total = attacker_roll.saturating_add(attacker.score(attribute));
    let (defender_rolls, kept) = roll_defense(rng, evading);
    let defender_total = kept.saturating_add(defender.score(defense));

    let effect = match attacker_total.cmp(&defender_total) {
        std::cmp::Ordering::Greater => AttackEffect::Damage {
            amount: attacker_total - defender_total,
        },
        std::cmp::Ordering::Less => AttackEffect::Momentum {
            amount: defender_total - attacker_total,
        },
        std::cmp::Ordering::Equal => AttackEffect::Tie,
    };

    let outcome = AttackOutcome {
        attacker_id: attacker.id(),
        defender_id: defender.id(),
        attribute,
        defending_attribute: defense,
        attacker_roll,
        attacker_total,
        defender_rolls,
        defender_total,
        evaded: evading,
        effect,
    };

    let mut status_changes = Vec::new();
    let mut removals = Vec::new();

    if evading {
        defender.remove_status(StatusEffect::Evading);
        status_changes.push(StatusChange {
            combatant_id: defender.id(),
            effect: StatusEffect::Evading,
            change: StatusChangeKind::Consumed,
        });
    }

    match effect {
        AttackEffect::Damage { amount } => {
            if defender.remove_status(StatusEffect::Escaping) {
                status_changes.push(StatusChange {
                    combatant_id: defender.id(),
                    effect: StatusEffect::Escaping,
                    change: StatusChangeKind::Cancelled,
                });
            }
            if defender.take_damage(amount) {
                removals.push(Removal {
                    combatant_id: defender.id(),
                    reason: RemovalReason::Defeated,
                });
            }
        }
        AttackEffect::Momentum { amount } => defender.gain_momentum(amount),
        AttackEffect::Tie => {}
    }

    debug!(
        attacker = %outcome.attacker_id,
        defender = %outcome.defender_id,
        attribute = %attribute,
        attacker_total,
        defender_total,
        ?effect,
        "attack resolved"
    );

    Ok(Resolved {
        outcome: ActionOutcome::Attack(outcome),
        status_changes,
        removals,
    })
}

fn apply_own_status(
    actor: &mut Combatant,
    effect: StatusEffect,
    turn: u64,
    outcome: ActionOutcome,
) -> Result<Resolved, CombatError> {
    ensure_alive(actor)?;
    let refreshed = actor.apply_status(effect, turn);
    let mut resolved = Resolved::new(outcome);
    resolved.status_changes.push(StatusChange {
        combatant_id: actor.id(),
        effect,
        change: if refreshed {
            StatusChangeKind::Refreshed
        } else {
            StatusChangeKind::Applied
        },
    });
    Ok(resolved)
}

/// Applies or refreshes Evading on `actor`, stamped with `turn`.
///
/// # Errors
///
/// Returns `CombatError::ActionOnDefeatedActor` if the actor is out of the
/// fight.
pub fn evade(actor: &mut Combatant, turn: u64) -> Result<Resolved, CombatError> {
    apply_own_status(actor, StatusEffect::Evading, turn, ActionOutcome::Evade)
}

/// Applies or refreshes Escaping on `actor`, stamped with `turn`.
///
/// # Errors
///
/// Returns `CombatError::ActionOnDefeatedActor` if the actor is out of the
/// fight.
pub fn escape(actor: &mut Combatant, turn: u64) -> Result<Resolved, CombatError> {
    apply_own_status(actor, StatusEffect::Escaping, turn, ActionOutcome::Escape)
}

/// Spends [`PUSH_MOMENTUM_COST`] momentum. Granting the bonus action is the
/// session's job.
///
/// # Errors
///
/// Returns `CombatError::ActionOnDefeatedActor` if the actor is out of the
/// fight, and `CombatError::InsufficientMomentum` (spending nothing) if the
/// actor holds less than the cost.
pub fn push(actor: &mut Combatant) -> Result<Resolved, CombatError> {
    ensure_alive(actor)?;
    let remaining = actor.spend_momentum(PUSH_MOMENTUM_COST)?;
    Ok(Resolved::new(ActionOutcome::Push {
        momentum_spent: PUSH_MOMENTUM_COST,
        momentum_remaining: remaining,
    }))
}
