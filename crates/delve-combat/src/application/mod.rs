//! Application layer for the Combat Resolution context.

pub mod command_handlers;
pub mod gateway;
pub mod query_handlers;
pub mod store;
