//! Shared application state.

use std::sync::{Arc, Mutex};

use delve_combat::application::gateway::{ActionRegistry, CommandGateway};
use delve_combat::application::store::SessionStore;
use delve_combat::domain::rules::CombatRules;
use delve_core::clock::Clock;
use delve_core::rng::DeterministicRng;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Stamps transcript events.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Dice for every session, locked per domain call.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Running sessions.
    pub sessions: Arc<SessionStore>,
    /// Command line parser and help source.
    pub gateway: Arc<CommandGateway>,
    /// Rules new sessions start with.
    pub rules: CombatRules,
}

impl AppState {
    /// Create new application state with an empty store and the standard
    /// action registry.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        rules: CombatRules,
    ) -> Self {
        Self {
            clock,
            rng,
            sessions: Arc::new(SessionStore::new()),
            gateway: Arc::new(CommandGateway::new(ActionRegistry::standard())),
            rules,
        }
    }
}
