//! Domain events for the Combat Resolution context.

use delve_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actions::TurnResult;
use super::session::SessionOutcome;

/// Emitted when a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStarted {
    /// The session identifier.
    pub session_id: Uuid,
    /// Combatant identifiers in turn order.
    pub turn_order: Vec<Uuid>,
}

/// Emitted when the session reaches a terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEnded {
    /// The session identifier.
    pub session_id: Uuid,
    /// Last turn played.
    pub turn: u64,
    /// How the session ended.
    pub outcome: SessionOutcome,
}

/// Event payload variants for the Combat Resolution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEventKind {
    /// A session was created.
    SessionStarted(SessionStarted),
    /// An action was taken.
    ActionResolved(TurnResult),
    /// The session is over.
    SessionEnded(SessionEnded),
}

/// Domain event envelope for the Combat Resolution context.
#[derive(Debug, Clone)]
pub struct CombatEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: CombatEventKind,
}

impl CombatEventKind {
    /// Routing name of the payload variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            CombatEventKind::SessionStarted(_) => "combat.session_started",
            CombatEventKind::ActionResolved(_) => "combat.action_resolved",
            CombatEventKind::SessionEnded(_) => "combat.session_ended",
        }
    }
}

impl DomainEvent for CombatEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
