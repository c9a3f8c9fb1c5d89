//! Delve: Combat Resolution bounded context.
//!
//! Responsible for contested attribute rolls, damage and momentum, the
//! evade/escape commitments that span turns, turn order, and the command
//! gateway that turns short command lines into actions.

pub mod application;
pub mod domain;
