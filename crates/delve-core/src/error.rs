//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A combat session was not found.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// A session with the same identifier already exists.
    #[error("session already exists: {0}")]
    SessionExists(Uuid),

    /// An infrastructure error (poisoned lock, broken RNG source).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
