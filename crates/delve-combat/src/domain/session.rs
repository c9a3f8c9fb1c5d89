//! Combat session: turn order, status expiry, termination.

use std::collections::HashSet;

use delve_core::clock::Clock;
use delve_core::event::EventMetadata;
use delve_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::actions::{
    Action, ActionOutcome, Removal, RemovalReason, StatusChange, StatusChangeKind, TurnResult,
};
use super::attribute::Attribute;
use super::combatant::{Combatant, CombatantSpec, StatusEffect};
use super::error::CombatError;
use super::events::{CombatEvent, CombatEventKind, SessionEnded, SessionStarted};
use super::resolver::{self, Resolved};
use super::rules::{CombatRules, HEALTH_RATINGS, MAX_ATTRIBUTE_SCORE};

/// How a session ended, or `Pending` while it is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Still running.
    Pending,
    /// The last opponent was defeated.
    Defeated {
        /// Who was defeated.
        combatant_id: Uuid,
        /// The last combatant standing.
        victor_id: Uuid,
    },
    /// The last opponent escaped.
    Escaped {
        /// Who escaped.
        combatant_id: Uuid,
    },
    /// The configured turn limit ran out.
    TurnLimitReached,
}

/// Turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Waiting for `actor` to act.
    AwaitingAction {
        /// Whose turn it is.
        actor: Uuid,
    },
    /// `actor` pushed and owes a bonus action in the same turn.
    BonusAction {
        /// Whose turn it is.
        actor: Uuid,
        /// Pushes spent so far this turn.
        pushes: u32,
    },
    /// The session is over.
    Terminal(SessionOutcome),
}

impl TurnPhase {
    /// Lowercase phase name for views.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TurnPhase::AwaitingAction { .. } => "awaiting_action",
            TurnPhase::BonusAction { .. } => "bonus_action",
            TurnPhase::Terminal(_) => "terminal",
        }
    }
}

/// One combat encounter.
///
/// Turn order is the order of the specs the session was created with and
/// never changes; removed combatants are skipped. `take_turn` is the only
/// mutating entry point and either applies an action completely or returns
/// an error without touching state.
#[derive(Debug)]
pub struct CombatSession {
    /// Session identifier.
    pub id: Uuid,
    combatants: Vec<Combatant>,
    current_turn_index: usize,
    turn_counter: u64,
    phase: TurnPhase,
    rules: CombatRules,
    next_sequence: i64,
    /// Transcript events not yet handed to a collaborator.
    uncommitted_events: Vec<CombatEvent>,
}

impl CombatSession {
    /// Creates a session with `specs` in turn order. The first spec acts on
    /// turn 1.
    ///
    /// # Errors
    ///
    /// Returns `CombatError::InvalidSetup` with fewer than two combatants,
    /// duplicate ids or names, a zero defeat threshold, an attribute score
    /// above [`MAX_ATTRIBUTE_SCORE`], or a health rating outside
    /// [`HEALTH_RATINGS`].
    pub fn new(
        id: Uuid,
        specs: Vec<CombatantSpec>,
        rules: CombatRules,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Self, CombatError> {
        if specs.len() < 2 {
            return Err(CombatError::InvalidSetup(
                "a session needs at least two combatants".to_owned(),
            ));
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for spec in &specs {
            if !ids.insert(spec.id) {
                return Err(CombatError::InvalidSetup(format!(
                    "duplicate combatant id {}",
                    spec.id
                )));
            }
            if spec.name.trim().is_empty() || !names.insert(spec.name.to_lowercase()) {
                return Err(CombatError::InvalidSetup(format!(
                    "combatant names must be unique and non-empty: {:?}",
                    spec.name
                )));
            }
            if spec.defeat_threshold == Some(0) {
                return Err(CombatError::InvalidSetup(format!(
                    "defeat threshold of {} must be positive",
                    spec.name
                )));
            }
            if let Some(rating) = spec.health_rating.filter(|r| !HEALTH_RATINGS.contains(r)) {
                return Err(CombatError::InvalidSetup(format!(
                    "health rating {rating} of {} must be within 1 to 10",
                    spec.name
                )));
            }
            if let Some(attribute) = Attribute::ALL
                .into_iter()
                .find(|a| spec.attributes.score(*a) > MAX_ATTRIBUTE_SCORE)
            {
                return Err(CombatError::InvalidSetup(format!(
                    "{attribute} of {} exceeds {MAX_ATTRIBUTE_SCORE}",
                    spec.name
                )));
            }
        }
        if rules.default_defeat_threshold == 0 {
            return Err(CombatError::InvalidSetup(
                "default defeat threshold must be positive".to_owned(),
            ));
        }

        let combatants: Vec<Combatant> = specs
            .into_iter()
            .map(|spec| Combatant::from_spec(spec, rules.default_defeat_threshold))
            .collect();
        let first = combatants[0].id();

        let mut session = Self {
            id,
            combatants,
            current_turn_index: 0,
            turn_counter: 1,
            phase: TurnPhase::AwaitingAction { actor: first },
            rules,
            next_sequence: 1,
            uncommitted_events: Vec::new(),
        };

        let turn_order = session.combatants.iter().map(Combatant::id).collect();
        session.record(
            CombatEventKind::SessionStarted(SessionStarted {
                session_id: id,
                turn_order,
            }),
            correlation_id,
            clock,
        );

        info!(session_id = %id, combatants = session.combatants.len(), "combat session started");
        Ok(session)
    }

    /// Combatants in turn order, including removed ones.
    #[must_use]
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    /// Looks up a combatant by id.
    #[must_use]
    pub fn combatant(&self, id: Uuid) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id() == id)
    }

    /// Looks up a combatant by case-insensitive name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Combatant> {
        let name = name.to_lowercase();
        self.combatants
            .iter()
            .find(|c| c.name().to_lowercase() == name)
    }

    /// Active combatants other than `actor`.
    pub fn opponents_of(&self, actor: Uuid) -> impl Iterator<Item = &Combatant> + '_ {
        self.combatants
            .iter()
            .filter(move |c| c.is_alive() && c.id() != actor)
    }

    /// Current turn number, starting at 1.
    #[must_use]
    pub fn turn_counter(&self) -> u64 {
        self.turn_counter
    }

    /// Turn state.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Rules this session runs under.
    #[must_use]
    pub fn rules(&self) -> &CombatRules {
        &self.rules
    }

    /// Whose turn it is, or `None` once the session is over.
    #[must_use]
    pub fn current_actor(&self) -> Option<Uuid> {
        match self.phase {
            TurnPhase::AwaitingAction { actor } | TurnPhase::BonusAction { actor, .. } => {
                Some(actor)
            }
            TurnPhase::Terminal(_) => None,
        }
    }

    /// The session outcome, `Pending` while running.
    #[must_use]
    pub fn outcome(&self) -> SessionOutcome {
        match self.phase {
            TurnPhase::Terminal(outcome) => outcome,
            _ => SessionOutcome::Pending,
        }
    }

    /// True once a terminal outcome is reached.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, TurnPhase::Terminal(_))
    }

    /// Transcript events recorded since the last drain.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[CombatEvent] {
        &self.uncommitted_events
    }

    /// Hands over recorded transcript events.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Takes `action` for `actor_id`.
    ///
    /// After a Push the same actor acts again; any other action ends the turn,
    /// moves to the next active combatant, and starts that combatant's turn,
    /// which expires its Evading and completes a pending escape.
    ///
    /// # Errors
    ///
    /// Returns `SessionOver` once terminal, `UnknownCombatant` for an actor
    /// outside the session, `ActionOnDefeatedActor` for a removed actor,
    /// `NotYourTurn` out of turn, and any error of the action itself
    /// (`InvalidTarget`, `InsufficientMomentum`, `BonusActionLimitReached`,
    /// `NoBonusActionPending`). On error nothing is changed.
    pub fn take_turn(
        &mut self,
        actor_id: Uuid,
        action: Action,
        rng: &mut dyn DeterministicRng,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<TurnResult, CombatError> {
        let (actor_idx, pushes) = self.validate_actor(actor_id)?;
        let turn = self.turn_counter;

        let resolved = match action {
            Action::Attack { target, attribute } => {
                let target_idx = self
                    .index_of(target)
                    .filter(|idx| *idx != actor_idx)
                    .ok_or(CombatError::InvalidTarget(target))?;
                let (attacker, defender) = pair_mut(&mut self.combatants, actor_idx, target_idx);
                resolver::attack(attacker, defender, attribute, rng)?
            }
            Action::Evade => resolver::evade(&mut self.combatants[actor_idx], turn)?,
            Action::Escape => resolver::escape(&mut self.combatants[actor_idx], turn)?,
            Action::Push => {
                let limit = self.rules.max_bonus_actions;
                if pushes >= limit {
                    return Err(CombatError::BonusActionLimitReached { limit });
                }
                resolver::push(&mut self.combatants[actor_idx])?
            }
            Action::Decline => {
                if !matches!(self.phase, TurnPhase::BonusAction { .. }) {
                    return Err(CombatError::NoBonusActionPending);
                }
                Resolved::new(ActionOutcome::Decline)
            }
        };

        debug!(
            session_id = %self.id,
            turn,
            actor = %actor_id,
            action = action.name(),
            "action resolved"
        );

        let Resolved {
            outcome,
            mut status_changes,
            mut removals,
        } = resolved;

        let removed_here = removals.last().copied();
        if let Some(removal) = removed_here {
            self.log_removal(removal);
        }

        if let Some(ended) = removed_here.and_then(|r| self.settle(r, actor_id)) {
            self.phase = TurnPhase::Terminal(ended);
        } else if matches!(action, Action::Push) {
            self.phase = TurnPhase::BonusAction {
                actor: actor_id,
                pushes: pushes + 1,
            };
        } else {
            self.advance(&mut status_changes, &mut removals);
        }

        let result = TurnResult {
            session_id: self.id,
            turn,
            actor_id,
            outcome,
            status_changes,
            removals,
            next_actor: self.current_actor(),
            bonus_action_pending: matches!(self.phase, TurnPhase::BonusAction { .. }),
            session_outcome: self.outcome(),
        };

        self.record(
            CombatEventKind::ActionResolved(result.clone()),
            correlation_id,
            clock,
        );
        if let TurnPhase::Terminal(outcome) = self.phase {
            info!(
                session_id = %self.id,
                turn = self.turn_counter,
                ?outcome,
                "combat session ended"
            );
            self.record(
                CombatEventKind::SessionEnded(SessionEnded {
                    session_id: self.id,
                    turn: self.turn_counter,
                    outcome,
                }),
                correlation_id,
                clock,
            );
        }

        Ok(result)
    }

    /// Checks who may act. Returns the actor's index and the pushes already
    /// spent this turn.
    fn validate_actor(&self, actor_id: Uuid) -> Result<(usize, u32), CombatError> {
        let (expected, pushes) = match self.phase {
            TurnPhase::Terminal(_) => return Err(CombatError::SessionOver),
            TurnPhase::AwaitingAction { actor } => (actor, 0),
            TurnPhase::BonusAction { actor, pushes } => (actor, pushes),
        };
        let idx = self
            .index_of(actor_id)
            .ok_or(CombatError::UnknownCombatant(actor_id))?;
        if !self.combatants[idx].is_alive() {
            return Err(CombatError::ActionOnDefeatedActor(actor_id));
        }
        if actor_id != expected {
            return Err(CombatError::NotYourTurn {
                actor: actor_id,
                expected,
            });
        }
        Ok((idx, pushes))
    }

    fn index_of(&self, id: Uuid) -> Option<usize> {
        self.combatants.iter().position(|c| c.id() == id)
    }

    fn active_count(&self) -> usize {
        self.combatants.iter().filter(|c| c.is_alive()).count()
    }

    /// Terminal outcome if `removal` left at most one combatant standing.
    fn settle(&self, removal: Removal, last_actor: Uuid) -> Option<SessionOutcome> {
        if self.active_count() > 1 {
            return None;
        }
        Some(match removal.reason {
            RemovalReason::Defeated => SessionOutcome::Defeated {
                combatant_id: removal.combatant_id,
                victor_id: self
                    .combatants
                    .iter()
                    .find(|c| c.is_alive())
                    .map_or(last_actor, Combatant::id),
            },
            RemovalReason::Escaped => SessionOutcome::Escaped {
                combatant_id: removal.combatant_id,
            },
        })
    }

    /// Ends the current turn and starts the next one, completing any escapes
    /// that come due along the way.
    ///
    /// Callers settle the session first, so at least two combatants are
    /// active on entry and every escape that would leave fewer ends the loop.
    fn advance(&mut self, status_changes: &mut Vec<StatusChange>, removals: &mut Vec<Removal>) {
        debug_assert!(self.active_count() > 1, "advance on a settled session");
        let count = self.combatants.len();
        loop {
            let Some(next) = (1..=count)
                .map(|step| (self.current_turn_index + step) % count)
                .find(|idx| self.combatants[*idx].is_alive())
            else {
                return;
            };

            self.current_turn_index = next;
            self.turn_counter += 1;

            if self.rules.max_turns.is_some_and(|max| self.turn_counter > max) {
                self.phase = TurnPhase::Terminal(SessionOutcome::TurnLimitReached);
                return;
            }

            let turn = self.turn_counter;
            let combatant = &mut self.combatants[next];
            let id = combatant.id();

            if combatant
                .status_applied_on(StatusEffect::Evading)
                .is_some_and(|applied| applied < turn)
            {
                combatant.remove_status(StatusEffect::Evading);
                status_changes.push(StatusChange {
                    combatant_id: id,
                    effect: StatusEffect::Evading,
                    change: StatusChangeKind::Expired,
                });
            }

            let escaping = combatant
                .status_applied_on(StatusEffect::Escaping)
                .is_some_and(|applied| applied < turn);
            if !escaping {
                self.phase = TurnPhase::AwaitingAction { actor: id };
                return;
            }

            combatant.mark_escaped();
            status_changes.push(StatusChange {
                combatant_id: id,
                effect: StatusEffect::Escaping,
                change: StatusChangeKind::Expired,
            });
            let removal = Removal {
                combatant_id: id,
                reason: RemovalReason::Escaped,
            };
            removals.push(removal);
            self.log_removal(removal);

            if let Some(ended) = self.settle(removal, id) {
                self.phase = TurnPhase::Terminal(ended);
                return;
            }
        }
    }

    fn log_removal(&self, removal: Removal) {
        info!(
            session_id = %self.id,
            combatant = %removal.combatant_id,
            reason = ?removal.reason,
            "combatant left the fight"
        );
    }

    fn record(&mut self, kind: CombatEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = CombatEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence,
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.next_sequence += 1;
        self.uncommitted_events.push(event);
    }
}

/// Borrows `items[a]` shared and `items[b]` mutably. `a` and `b` must differ.
fn pair_mut(items: &mut [Combatant], a: usize, b: usize) -> (&Combatant, &mut Combatant) {
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&right[0], &mut left[b])
    }
}
