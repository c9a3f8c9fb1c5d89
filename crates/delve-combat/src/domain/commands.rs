//! Commands for the Combat Resolution context.

use delve_core::command::Command;
use uuid::Uuid;

use super::combatant::CombatantSpec;

/// Command to open a new combat session.
#[derive(Debug, Clone)]
pub struct StartCombat {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to create.
    pub session_id: Uuid,
    /// Combatants in turn order.
    pub combatants: Vec<CombatantSpec>,
}

impl Command for StartCombat {
    fn command_type(&self) -> &'static str {
        "combat.start_combat"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to take one action from a textual command line.
#[derive(Debug, Clone)]
pub struct TakeTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to act in.
    pub session_id: Uuid,
    /// Who is acting.
    pub actor_id: Uuid,
    /// Command line, e.g. `attack goblin strength`.
    pub input: String,
}

impl Command for TakeTurn {
    fn command_type(&self) -> &'static str {
        "combat.take_turn"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to discard a session, finished or not.
#[derive(Debug, Clone)]
pub struct EndCombat {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to discard.
    pub session_id: Uuid,
}

impl Command for EndCombat {
    fn command_type(&self) -> &'static str {
        "combat.end_combat"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
