//! Command gateway: command lines to structured actions, plus help text.
//!
//! The registry is an explicit value built at startup and owned by the
//! gateway. Lines that do not parse are rejected here and never reach the
//! session.

use delve_core::clock::Clock;
use delve_core::rng::DeterministicRng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::actions::{Action, TurnResult};
use crate::domain::attribute::Attribute;
use crate::domain::error::CombatError;
use crate::domain::session::CombatSession;

/// Why a command line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The line was blank.
    #[error("no command given")]
    EmptyCommand,

    /// The first word names no registered action.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A required argument was left out.
    #[error("{action} needs a {argument}")]
    MissingArgument {
        /// Action being parsed.
        action: &'static str,
        /// What is missing.
        argument: &'static str,
    },

    /// An action that takes no arguments was given some.
    #[error("{action} takes no arguments, got {argument:?}")]
    UnexpectedArgument {
        /// Action being parsed.
        action: &'static str,
        /// The extra input.
        argument: String,
    },

    /// The attribute word is not an attribute.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// No combatant in the session has this name.
    #[error("no combatant named {0:?}")]
    UnknownTarget(String),

    /// Two registry entries claim the same word.
    #[error("action word {0:?} is registered twice")]
    DuplicateAction(&'static str),

    /// The session rejected the action.
    #[error(transparent)]
    Combat(#[from] CombatError),
}

/// Builds an action from the arguments after the action word.
pub type ActionParser = fn(&CombatSession, Uuid, &[&str]) -> Result<Action, CommandError>;

/// One registered action.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    /// Canonical name.
    pub name: &'static str,
    /// Other words accepted for this action.
    pub aliases: &'static [&'static str],
    /// Argument synopsis.
    pub usage: &'static str,
    /// One-line description.
    pub summary: &'static str,
    /// Argument parser.
    pub parse: ActionParser,
}

impl ActionSpec {
    fn answers_to(&self, word: &str) -> bool {
        self.name.eq_ignore_ascii_case(word)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(word))
    }

    fn words(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

/// Help entry for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionHelp {
    /// Canonical name.
    pub name: &'static str,
    /// Accepted aliases.
    pub aliases: Vec<&'static str>,
    /// Argument synopsis.
    pub usage: &'static str,
    /// One-line description.
    pub summary: &'static str,
}

impl From<&ActionSpec> for ActionHelp {
    fn from(spec: &ActionSpec) -> Self {
        Self {
            name: spec.name,
            aliases: spec.aliases.to_vec(),
            usage: spec.usage,
            summary: spec.summary,
        }
    }
}

/// Name/alias → action table.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    specs: Vec<ActionSpec>,
}

impl ActionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `spec`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::DuplicateAction` if its name or an alias is
    /// already taken.
    pub fn register(&mut self, spec: ActionSpec) -> Result<(), CommandError> {
        if let Some(taken) = spec.words().find(|w| self.lookup(w).is_some()) {
            return Err(CommandError::DuplicateAction(taken));
        }
        self.specs.push(spec);
        Ok(())
    }

    /// The five combat actions.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            specs: vec![
                ActionSpec {
                    name: "attack",
                    aliases: &["a", "hit", "strike"],
                    usage: "attack [target] <strength|agility|intelligence>",
                    summary: "Roll an attribute against the target's defending attribute.",
                    parse: parse_attack,
                },
                ActionSpec {
                    name: "evade",
                    aliases: &["dodge"],
                    usage: "evade",
                    summary: "Defend with two dice, keeping the higher, until your next turn.",
                    parse: |_, _, args| no_arguments("evade", args, Action::Evade),
                },
                ActionSpec {
                    name: "push",
                    aliases: &[],
                    usage: "push",
                    summary: "Spend 5 momentum to take another action this turn.",
                    parse: |_, _, args| no_arguments("push", args, Action::Push),
                },
                ActionSpec {
                    name: "escape",
                    aliases: &["flee", "run"],
                    usage: "escape",
                    summary: "Leave the fight at your next turn unless you are hit first.",
                    parse: |_, _, args| no_arguments("escape", args, Action::Escape),
                },
                ActionSpec {
                    name: "decline",
                    aliases: &["pass"],
                    usage: "decline",
                    summary: "Give up the extra action granted by push.",
                    parse: |_, _, args| no_arguments("decline", args, Action::Decline),
                },
            ],
        }
    }

    /// Finds the action answering to `word`, case-insensitively.
    #[must_use]
    pub fn lookup(&self, word: &str) -> Option<&ActionSpec> {
        self.specs.iter().find(|spec| spec.answers_to(word))
    }

    /// Registered actions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.specs.iter()
    }
}

fn no_arguments(
    action: &'static str,
    args: &[&str],
    parsed: Action,
) -> Result<Action, CommandError> {
    if args.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnexpectedArgument {
            action,
            argument: args.join(" "),
        })
    }
}

/// `attack [target words...] [with] <attribute>`. The target may be left out
/// when exactly one opponent remains.
fn parse_attack(
    session: &CombatSession,
    actor: Uuid,
    args: &[&str],
) -> Result<Action, CommandError> {
    let Some((last, rest)) = args.split_last() else {
        return Err(CommandError::MissingArgument {
            action: "attack",
            argument: "attribute",
        });
    };
    let attribute: Attribute = last
        .parse()
        .map_err(|_| CommandError::UnknownAttribute((*last).to_owned()))?;

    let rest = match rest.split_last() {
        Some((with, before)) if with.eq_ignore_ascii_case("with") => before,
        _ => rest,
    };

    let target = if rest.is_empty() {
        let mut opponents = session.opponents_of(actor);
        match (opponents.next(), opponents.next()) {
            (Some(only), None) => only.id(),
            _ => {
                return Err(CommandError::MissingArgument {
                    action: "attack",
                    argument: "target",
                });
            }
        }
    } else {
        let name = rest.join(" ");
        session
            .find_by_name(&name)
            .map(|c| c.id())
            .ok_or(CommandError::UnknownTarget(name))?
    };

    Ok(Action::Attack { target, attribute })
}

/// Parses command lines against a registry and hands actions to a session.
#[derive(Debug, Clone)]
pub struct CommandGateway {
    registry: ActionRegistry,
}

impl CommandGateway {
    /// Creates a gateway owning `registry`.
    #[must_use]
    pub fn new(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    /// Every available action with its one-line summary.
    #[must_use]
    pub fn help(&self) -> Vec<ActionHelp> {
        self.registry.iter().map(ActionHelp::from).collect()
    }

    /// Help for the action answering to `word`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::UnknownAction` if no action answers to `word`.
    pub fn describe(&self, word: &str) -> Result<ActionHelp, CommandError> {
        self.registry
            .lookup(word)
            .map(ActionHelp::from)
            .ok_or_else(|| CommandError::UnknownAction(word.to_owned()))
    }

    /// Parses `line` into an action for `actor` in `session`.
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` describing the first word or argument that
    /// could not be understood.
    pub fn parse(
        &self,
        session: &CombatSession,
        actor: Uuid,
        line: &str,
    ) -> Result<Action, CommandError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((word, args)) = words.split_first() else {
            return Err(CommandError::EmptyCommand);
        };
        let spec = self
            .registry
            .lookup(word)
            .ok_or_else(|| CommandError::UnknownAction((*word).to_owned()))?;
        (spec.parse)(session, actor, args)
    }

    /// Parses `line` and takes the resulting action.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for lines that do not parse and
    /// `CommandError::Combat` for actions the session rejects. Either way the
    /// session is unchanged.
    pub fn execute(
        &self,
        session: &mut CombatSession,
        actor: Uuid,
        line: &str,
        rng: &mut dyn DeterministicRng,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<TurnResult, CommandError> {
        let action = self.parse(session, actor, line)?;
        Ok(session.take_turn(actor, action, rng, correlation_id, clock)?)
    }
}
