//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use delve_combat::application::command_handlers::HandlerError;
use delve_combat::application::gateway::CommandError;
use delve_combat::domain::error::CombatError;
use delve_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// The config file or an environment override is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A handler failed.
    Handler(HandlerError),
    /// Help was asked for an action that does not exist.
    ActionNotFound(String),
}

impl From<HandlerError> for ApiError {
    fn from(err: HandlerError) -> Self {
        Self::Handler(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Handler(HandlerError::Domain(err))
    }
}

fn domain_status(err: &DomainError) -> (StatusCode, &'static str) {
    match err {
        DomainError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
        DomainError::SessionExists(_) => (StatusCode::CONFLICT, "session_exists"),
        DomainError::Infrastructure(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
        }
    }
}

fn combat_status(err: &CombatError) -> (StatusCode, &'static str) {
    match err {
        CombatError::NotYourTurn { .. } => (StatusCode::CONFLICT, "not_your_turn"),
        CombatError::SessionOver => (StatusCode::CONFLICT, "session_over"),
        CombatError::InvalidSetup(_) => (StatusCode::BAD_REQUEST, "invalid_setup"),
        CombatError::UnknownCombatant(_) => (StatusCode::BAD_REQUEST, "unknown_combatant"),
        CombatError::InvalidTarget(_) => (StatusCode::BAD_REQUEST, "invalid_target"),
        CombatError::InsufficientMomentum { .. } => {
            (StatusCode::BAD_REQUEST, "insufficient_momentum")
        }
        CombatError::ActionOnDefeatedActor(_) => {
            (StatusCode::BAD_REQUEST, "action_on_defeated_actor")
        }
        CombatError::NoBonusActionPending => (StatusCode::BAD_REQUEST, "no_bonus_action_pending"),
        CombatError::BonusActionLimitReached { .. } => {
            (StatusCode::BAD_REQUEST, "bonus_action_limit_reached")
        }
    }
}

fn command_status(err: &CommandError) -> (StatusCode, &'static str) {
    match err {
        CommandError::Combat(inner) => combat_status(inner),
        CommandError::EmptyCommand => (StatusCode::BAD_REQUEST, "empty_command"),
        CommandError::UnknownAction(_) => (StatusCode::BAD_REQUEST, "unknown_action"),
        CommandError::MissingArgument { .. } => (StatusCode::BAD_REQUEST, "missing_argument"),
        CommandError::UnexpectedArgument { .. } => {
            (StatusCode::BAD_REQUEST, "unexpected_argument")
        }
        CommandError::UnknownAttribute(_) => (StatusCode::BAD_REQUEST, "unknown_attribute"),
        CommandError::UnknownTarget(_) => (StatusCode::BAD_REQUEST, "unknown_target"),
        CommandError::DuplicateAction(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "duplicate_action")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Handler(HandlerError::Domain(e)) => domain_status(e),
            ApiError::Handler(HandlerError::Combat(e)) => combat_status(e),
            ApiError::Handler(HandlerError::Command(e)) => command_status(e),
            ApiError::ActionNotFound(_) => (StatusCode::NOT_FOUND, "action_not_found"),
        };

        let message = match self {
            ApiError::Handler(e) => e.to_string(),
            ApiError::ActionNotFound(name) => format!("unknown action: {name}"),
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        let response = err.into().into_response();
        response.status()
    }

    fn command(err: CommandError) -> ApiError {
        ApiError::Handler(HandlerError::Command(err))
    }

    #[test]
    fn test_session_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::SessionNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_session_exists_maps_to_409() {
        assert_eq!(
            status_of(DomainError::SessionExists(Uuid::new_v4())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("lock poisoned".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_turn_order_errors_map_to_409() {
        assert_eq!(
            status_of(command(CommandError::Combat(CombatError::NotYourTurn {
                actor: Uuid::new_v4(),
                expected: Uuid::new_v4(),
            }))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(command(CommandError::Combat(CombatError::SessionOver))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_rule_and_parse_errors_map_to_400() {
        assert_eq!(
            status_of(command(CommandError::Combat(
                CombatError::InsufficientMomentum {
                    required: 5,
                    available: 2,
                }
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(command(CommandError::UnknownAction("sing".into()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(HandlerError::Combat(CombatError::InvalidSetup(
                "too few".into()
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_action_not_found_maps_to_404() {
        assert_eq!(
            status_of(ApiError::ActionNotFound("sing".into())),
            StatusCode::NOT_FOUND
        );
    }
}
