//! Query handlers for the Combat Resolution context.
//!
//! This module contains query handlers that read a stored session and return
//! read-only view DTOs.

use delve_core::error::DomainError;
use serde::Serialize;
use uuid::Uuid;

use crate::application::store::SessionStore;
use crate::domain::attribute::Attributes;
use crate::domain::combatant::{Combatant, CombatantKind, Standing, StatusEffect};
use crate::domain::session::{CombatSession, SessionOutcome, TurnPhase};

/// Read-only view of one active status.
#[derive(Debug, Serialize)]
pub struct StatusView {
    /// The status effect.
    pub effect: StatusEffect,
    /// Turn on which it was applied.
    pub applied_on_turn: u64,
}

/// Read-only view of a combatant.
#[derive(Debug, Serialize)]
pub struct CombatantView {
    /// The combatant identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Player or creature.
    pub kind: CombatantKind,
    /// Attribute scores.
    pub attributes: Attributes,
    /// Momentum held.
    pub momentum: u32,
    /// Damage accumulated.
    pub damage_taken: u32,
    /// Damage at which the combatant is defeated.
    pub defeat_threshold: u32,
    /// Active statuses.
    pub statuses: Vec<StatusView>,
    /// Active, defeated or escaped.
    pub standing: Standing,
}

/// Read-only view of a combat session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Current turn number.
    pub turn: u64,
    /// Current phase as a string.
    pub phase: String,
    /// Whose turn it is, if the session is running.
    pub current_actor: Option<Uuid>,
    /// True while the current actor owes a bonus action.
    pub bonus_action_pending: bool,
    /// Outcome, `pending` while running.
    pub outcome: SessionOutcome,
    /// Combatants in turn order.
    pub combatants: Vec<CombatantView>,
}

fn combatant_view(c: &Combatant) -> CombatantView {
    CombatantView {
        id: c.id(),
        name: c.name().to_owned(),
        kind: c.kind(),
        attributes: *c.attributes(),
        momentum: c.momentum(),
        damage_taken: c.damage_taken(),
        defeat_threshold: c.defeat_threshold(),
        statuses: c
            .statuses()
            .filter_map(|effect| {
                c.status_applied_on(effect).map(|applied_on_turn| StatusView {
                    effect,
                    applied_on_turn,
                })
            })
            .collect(),
        standing: c.standing(),
    }
}

/// Builds the view of `session`.
#[must_use]
pub fn session_view(session: &CombatSession) -> SessionView {
    let phase = session.phase();
    SessionView {
        session_id: session.id,
        turn: session.turn_counter(),
        phase: phase.name().to_owned(),
        current_actor: session.current_actor(),
        bonus_action_pending: matches!(phase, TurnPhase::BonusAction { .. }),
        outcome: session.outcome(),
        combatants: session.combatants().iter().map(combatant_view).collect(),
    }
}

/// Retrieves a session by its ID.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if no session has the ID and
/// `DomainError::Infrastructure` if a lock is poisoned.
pub fn get_session_by_id(
    session_id: Uuid,
    store: &SessionStore,
) -> Result<SessionView, DomainError> {
    store.with_session(session_id, |session| session_view(session))
}
