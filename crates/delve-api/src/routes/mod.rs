//! Route modules.

pub mod combat;
pub mod health;
