//! Command abstractions.

use uuid::Uuid;

/// Trait implemented by every command the application layer accepts.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Routing name for this command, e.g. `combat.take_turn`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID carried into every event the command produces.
    fn correlation_id(&self) -> Uuid;
}
