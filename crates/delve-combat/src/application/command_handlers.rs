//! Command handlers for the Combat Resolution context.
//!
//! Handlers look the session up in the store, run the domain call under the
//! session lock, and hand back the transcript events it produced.

use std::sync::Mutex;

use delve_core::clock::Clock;
use delve_core::command::Command;
use delve_core::error::DomainError;
use delve_core::event::DomainEvent;
use delve_core::rng::DeterministicRng;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::gateway::{CommandError, CommandGateway};
use crate::application::store::SessionStore;
use crate::domain::actions::TurnResult;
use crate::domain::commands::{EndCombat, StartCombat, TakeTurn};
use crate::domain::error::CombatError;
use crate::domain::events::CombatEvent;
use crate::domain::rules::CombatRules;
use crate::domain::session::CombatSession;

/// Errors surfaced by combat command handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Store or infrastructure failure.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The session could not be set up.
    #[error(transparent)]
    Combat(#[from] CombatError),

    /// The command line was rejected, by the gateway or by the session.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// A taken turn together with the transcript events it recorded.
#[derive(Debug)]
pub struct HandledTurn {
    /// What happened.
    pub result: TurnResult,
    /// `combat.action_resolved`, plus `combat.session_ended` when the turn
    /// finished the session.
    pub events: Vec<CombatEvent>,
}

fn log_events(events: &[CombatEvent]) {
    for event in events {
        debug!(
            event_type = event.event_type(),
            sequence = event.metadata().sequence_number,
            "combat event recorded"
        );
    }
}

/// Handles the `StartCombat` command: builds the session and stores it.
///
/// # Errors
///
/// Returns `HandlerError::Combat` for an invalid line-up and
/// `HandlerError::Domain` if the session id is already in use.
pub fn handle_start_combat(
    command: &StartCombat,
    rules: &CombatRules,
    clock: &dyn Clock,
    store: &SessionStore,
) -> Result<Vec<CombatEvent>, HandlerError> {
    let mut session = CombatSession::new(
        command.session_id,
        command.combatants.clone(),
        rules.clone(),
        command.correlation_id,
        clock,
    )?;
    let events = session.drain_events();
    store.insert(session)?;

    info!(
        command = command.command_type(),
        session_id = %command.session_id,
        correlation_id = %command.correlation_id,
        combatants = command.combatants.len(),
        "combat started"
    );
    log_events(&events);
    Ok(events)
}

/// Handles the `TakeTurn` command: parses the line through the gateway and
/// applies it to the stored session.
///
/// The session lock is taken before the RNG lock, and both are held only for
/// the synchronous domain call.
///
/// # Errors
///
/// Returns `HandlerError::Domain` for an unknown session or a poisoned lock
/// and `HandlerError::Command` for a rejected command line or action.
pub fn handle_take_turn(
    command: &TakeTurn,
    gateway: &CommandGateway,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &SessionStore,
) -> Result<HandledTurn, HandlerError> {
    let handled = store.with_session(command.session_id, |session| {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        let result = gateway.execute(
            session,
            command.actor_id,
            &command.input,
            &mut *rng_guard,
            command.correlation_id,
            clock,
        )?;
        Ok::<_, HandlerError>(HandledTurn {
            result,
            events: session.drain_events(),
        })
    })??;

    info!(
        command = command.command_type(),
        session_id = %command.session_id,
        actor_id = %command.actor_id,
        correlation_id = %command.correlation_id,
        turn = handled.result.turn,
        action = handled.result.outcome.name(),
        "turn taken"
    );
    log_events(&handled.events);
    Ok(handled)
}

/// Handles the `EndCombat` command: drops the session from the store.
///
/// # Errors
///
/// Returns `HandlerError::Domain` for an unknown session or a poisoned lock.
pub fn handle_end_combat(command: &EndCombat, store: &SessionStore) -> Result<(), HandlerError> {
    if !store.remove(command.session_id)? {
        return Err(DomainError::SessionNotFound(command.session_id).into());
    }

    info!(
        command = command.command_type(),
        session_id = %command.session_id,
        correlation_id = %command.correlation_id,
        "combat session discarded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use delve_core::error::DomainError;
    use delve_core::event::DomainEvent;
    use delve_core::rng::DeterministicRng;
    use delve_test_support::{SequenceRng, fixed_clock};
    use uuid::Uuid;

    use crate::application::command_handlers::{
        HandlerError, handle_end_combat, handle_start_combat, handle_take_turn,
    };
    use crate::application::gateway::{ActionRegistry, CommandError, CommandGateway};
    use crate::application::store::SessionStore;
    use crate::domain::actions::AttackEffect;
    use crate::domain::attribute::Attributes;
    use crate::domain::combatant::CombatantSpec;
    use crate::domain::commands::{EndCombat, StartCombat, TakeTurn};
    use crate::domain::error::CombatError;
    use crate::domain::rules::CombatRules;
    use crate::domain::session::SessionOutcome;

    struct Setup {
        store: SessionStore,
        gateway: CommandGateway,
        session_id: Uuid,
        hero: Uuid,
        ogre: Uuid,
    }

    fn started(rules: &CombatRules) -> Setup {
        let store = SessionStore::new();
        let session_id = Uuid::new_v4();
        let hero = Uuid::new_v4();
        let ogre = Uuid::new_v4();
        let command = StartCombat {
            correlation_id: Uuid::new_v4(),
            session_id,
            combatants: vec![
                CombatantSpec::player(hero, "Hero", Attributes::new(5, 3, 2)),
                CombatantSpec::creature(ogre, "Ogre", Attributes::new(6, 2, 1))
                    .with_defeat_threshold(4),
            ],
        };
        handle_start_combat(&command, rules, &fixed_clock(), &store).unwrap();
        Setup {
            store,
            gateway: CommandGateway::new(ActionRegistry::standard()),
            session_id,
            hero,
            ogre,
        }
    }

    fn turn(setup: &Setup, actor_id: Uuid, input: &str) -> TakeTurn {
        TakeTurn {
            correlation_id: Uuid::new_v4(),
            session_id: setup.session_id,
            actor_id,
            input: input.to_owned(),
        }
    }

    #[test]
    fn test_handle_start_combat_stores_session_and_returns_started_event() {
        let store = SessionStore::new();
        let session_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let command = StartCombat {
            correlation_id,
            session_id,
            combatants: vec![
                CombatantSpec::player(Uuid::new_v4(), "Hero", Attributes::new(5, 3, 2)),
                CombatantSpec::creature(Uuid::new_v4(), "Bat", Attributes::new(1, 4, 1)),
            ],
        };

        let events =
            handle_start_combat(&command, &CombatRules::default(), &fixed_clock(), &store).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "combat.session_started");
        assert_eq!(events[0].metadata().aggregate_id, session_id);
        assert_eq!(events[0].metadata().sequence_number, 1);
        assert_eq!(events[0].metadata().correlation_id, correlation_id);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_handle_start_combat_rejects_bad_lineup() {
        let store = SessionStore::new();
        let command = StartCombat {
            correlation_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            combatants: vec![CombatantSpec::player(
                Uuid::new_v4(),
                "Alone",
                Attributes::new(1, 1, 1),
            )],
        };

        let result = handle_start_combat(&command, &CombatRules::default(), &fixed_clock(), &store);
        assert!(matches!(
            result,
            Err(HandlerError::Combat(CombatError::InvalidSetup(_)))
        ));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_handle_start_combat_rejects_duplicate_session() {
        let setup = started(&CombatRules::default());
        let command = StartCombat {
            correlation_id: Uuid::new_v4(),
            session_id: setup.session_id,
            combatants: vec![
                CombatantSpec::player(Uuid::new_v4(), "A", Attributes::new(1, 1, 1)),
                CombatantSpec::player(Uuid::new_v4(), "B", Attributes::new(1, 1, 1)),
            ],
        };

        let result = handle_start_combat(
            &command,
            &CombatRules::default(),
            &fixed_clock(),
            &setup.store,
        );
        assert!(matches!(
            result,
            Err(HandlerError::Domain(DomainError::SessionExists(_)))
        ));
    }

    #[test]
    fn test_handle_take_turn_resolves_attack() {
        let setup = started(&CombatRules::default());
        // Hero strength 5 + 3 = 8 against ogre agility 2 + 1 = 3.
        let rng: Mutex<SequenceRng> = Mutex::new(SequenceRng::new(vec![3, 1]));
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;

        let handled = handle_take_turn(
            &turn(&setup, setup.hero, "attack strength"),
            &setup.gateway,
            &fixed_clock(),
            rng_ref,
            &setup.store,
        )
        .unwrap();

        assert_eq!(
            handled.result.attack().unwrap().effect,
            AttackEffect::Damage { amount: 5 }
        );
        // 5 damage against a threshold of 4 ends the fight.
        assert_eq!(
            handled.result.session_outcome,
            SessionOutcome::Defeated {
                combatant_id: setup.ogre,
                victor_id: setup.hero,
            }
        );
        let types: Vec<&str> = handled.events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["combat.action_resolved", "combat.session_ended"]);
        assert_eq!(handled.events[0].metadata().sequence_number, 2);
    }

    #[test]
    fn test_handle_take_turn_out_of_turn_is_rejected() {
        let setup = started(&CombatRules::default());
        let rng: Mutex<SequenceRng> = Mutex::new(SequenceRng::new(vec![]));
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;

        let result = handle_take_turn(
            &turn(&setup, setup.ogre, "evade"),
            &setup.gateway,
            &fixed_clock(),
            rng_ref,
            &setup.store,
        );

        assert!(matches!(
            result,
            Err(HandlerError::Command(CommandError::Combat(
                CombatError::NotYourTurn { .. }
            )))
        ));
    }

    #[test]
    fn test_handle_take_turn_unknown_session() {
        let setup = started(&CombatRules::default());
        let rng: Mutex<SequenceRng> = Mutex::new(SequenceRng::new(vec![]));
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;
        let mut command = turn(&setup, setup.hero, "evade");
        command.session_id = Uuid::new_v4();

        let result = handle_take_turn(
            &command,
            &setup.gateway,
            &fixed_clock(),
            rng_ref,
            &setup.store,
        );

        assert!(matches!(
            result,
            Err(HandlerError::Domain(DomainError::SessionNotFound(_)))
        ));
    }

    #[test]
    fn test_handle_take_turn_bad_command_leaves_session_unchanged() {
        let setup = started(&CombatRules::default());
        let rng: Mutex<SequenceRng> = Mutex::new(SequenceRng::new(vec![]));
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;

        let result = handle_take_turn(
            &turn(&setup, setup.hero, "attack ogre wisdom"),
            &setup.gateway,
            &fixed_clock(),
            rng_ref,
            &setup.store,
        );

        assert!(matches!(
            result,
            Err(HandlerError::Command(CommandError::UnknownAttribute(_)))
        ));
        let (turn_counter, actor) = setup
            .store
            .with_session(setup.session_id, |s| (s.turn_counter(), s.current_actor()))
            .unwrap();
        assert_eq!(turn_counter, 1);
        assert_eq!(actor, Some(setup.hero));
    }

    #[test]
    fn test_handle_take_turn_evade_advances_to_next_actor() {
        let setup = started(&CombatRules::default());
        let rng: Mutex<SequenceRng> = Mutex::new(SequenceRng::new(vec![]));
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;

        let handled = handle_take_turn(
            &turn(&setup, setup.hero, "dodge"),
            &setup.gateway,
            &fixed_clock(),
            rng_ref,
            &setup.store,
        )
        .unwrap();

        assert_eq!(handled.result.next_actor, Some(setup.ogre));
        assert_eq!(handled.result.session_outcome, SessionOutcome::Pending);
        assert_eq!(handled.events.len(), 1);
    }

    #[test]
    fn test_oversized_score_is_rejected_and_other_sessions_keep_rolling() {
        let setup = started(&CombatRules::default());
        let command = StartCombat {
            correlation_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            combatants: vec![
                CombatantSpec::player(
                    Uuid::new_v4(),
                    "Titan",
                    Attributes::new(u32::MAX, 1, 1),
                ),
                CombatantSpec::creature(Uuid::new_v4(), "Rat", Attributes::new(1, 1, 1)),
            ],
        };
        let result = handle_start_combat(
            &command,
            &CombatRules::default(),
            &fixed_clock(),
            &setup.store,
        );
        assert!(matches!(
            result,
            Err(HandlerError::Combat(CombatError::InvalidSetup(_)))
        ));
        assert_eq!(setup.store.len().unwrap(), 1);

        let rng: Mutex<SequenceRng> = Mutex::new(SequenceRng::new(vec![3, 1]));
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;
        let handled = handle_take_turn(
            &turn(&setup, setup.hero, "attack ogre strength"),
            &setup.gateway,
            &fixed_clock(),
            rng_ref,
            &setup.store,
        )
        .unwrap();
        assert!(handled.result.attack().is_some());
        assert!(!rng.is_poisoned());
    }

    #[test]
    fn test_handle_end_combat_drops_session() {
        let setup = started(&CombatRules::default());
        let command = EndCombat {
            correlation_id: Uuid::new_v4(),
            session_id: setup.session_id,
        };

        handle_end_combat(&command, &setup.store).unwrap();

        assert!(setup.store.is_empty().unwrap());
        assert!(matches!(
            handle_end_combat(&command, &setup.store),
            Err(HandlerError::Domain(DomainError::SessionNotFound(_)))
        ));
    }
}
