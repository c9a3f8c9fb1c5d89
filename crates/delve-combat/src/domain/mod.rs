//! Domain model for the Combat Resolution context.

pub mod actions;
pub mod attribute;
pub mod combatant;
pub mod commands;
pub mod error;
pub mod events;
pub mod resolver;
pub mod rules;
pub mod session;
