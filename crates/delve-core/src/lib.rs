//! Delve Core: shared domain abstractions.
//!
//! This crate defines the small set of traits and types the combat context
//! and the API server both depend on: time, randomness, commands, events and
//! the top-level domain error. It contains no game rules.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod rng;
