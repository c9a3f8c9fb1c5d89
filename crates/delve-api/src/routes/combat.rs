//! Routes for the Combat Resolution bounded context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use delve_combat::application::command_handlers;
use delve_combat::application::gateway::ActionHelp;
use delve_combat::application::query_handlers::{self, SessionView};
use delve_combat::domain::actions::TurnResult;
use delve_combat::domain::combatant::CombatantSpec;
use delve_combat::domain::commands;
use delve_core::event::DomainEvent;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct StartCombatRequest {
    /// Session id to use. Generated when absent.
    pub session_id: Option<Uuid>,
    /// Combatants in turn order.
    pub combatants: Vec<CombatantSpec>,
}

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct StartCombatResponse {
    /// The new session.
    pub session_id: Uuid,
    /// IDs of the transcript events recorded.
    pub event_ids: Vec<Uuid>,
}

/// Request body for POST /{session_id}/turns.
#[derive(Debug, Deserialize)]
pub struct TakeTurnRequest {
    /// Who is acting.
    pub actor_id: Uuid,
    /// Command line, e.g. `attack goblin strength`.
    pub command: String,
}

/// Response body for POST /{session_id}/turns.
#[derive(Debug, Serialize)]
pub struct TakeTurnResponse {
    /// What happened.
    #[serde(flatten)]
    pub result: TurnResult,
    /// IDs of the transcript events recorded.
    pub event_ids: Vec<Uuid>,
}

/// POST /
#[instrument(skip(state, request), fields(combatants = request.combatants.len()))]
async fn start_combat(
    State(state): State<AppState>,
    Json(request): Json<StartCombatRequest>,
) -> Result<Json<StartCombatResponse>, ApiError> {
    let command = commands::StartCombat {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id.unwrap_or_else(Uuid::new_v4),
        combatants: request.combatants,
    };

    info!(correlation_id = %command.correlation_id, "handling start_combat command");

    let events = command_handlers::handle_start_combat(
        &command,
        &state.rules,
        state.clock.as_ref(),
        &state.sessions,
    )?;

    Ok(Json(StartCombatResponse {
        session_id: command.session_id,
        event_ids: events.iter().map(|e| e.metadata().event_id).collect(),
    }))
}

/// GET /{session_id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let view = query_handlers::get_session_by_id(session_id, &state.sessions)?;
    Ok(Json(view))
}

/// DELETE /{session_id}
#[instrument(skip(state))]
async fn end_combat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = commands::EndCombat {
        correlation_id: Uuid::new_v4(),
        session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling end_combat command");

    command_handlers::handle_end_combat(&command, &state.sessions)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{session_id}/turns
#[instrument(skip(state, request), fields(actor_id = %request.actor_id))]
async fn take_turn(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<TakeTurnRequest>,
) -> Result<Json<TakeTurnResponse>, ApiError> {
    let command = commands::TakeTurn {
        correlation_id: Uuid::new_v4(),
        session_id,
        actor_id: request.actor_id,
        input: request.command,
    };

    info!(correlation_id = %command.correlation_id, "handling take_turn command");

    let handled = command_handlers::handle_take_turn(
        &command,
        &state.gateway,
        state.clock.as_ref(),
        &*state.rng,
        &state.sessions,
    )?;

    Ok(Json(TakeTurnResponse {
        event_ids: handled.events.iter().map(|e| e.metadata().event_id).collect(),
        result: handled.result,
    }))
}

/// GET /actions
async fn list_actions(State(state): State<AppState>) -> Json<Vec<ActionHelp>> {
    Json(state.gateway.help())
}

/// GET /actions/{name}
async fn describe_action(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ActionHelp>, ApiError> {
    state
        .gateway
        .describe(&name)
        .map(Json)
        .map_err(|_| ApiError::ActionNotFound(name))
}

/// Returns the router for the combat context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_combat))
        .route("/actions", get(list_actions))
        .route("/actions/{name}", get(describe_action))
        .route("/{session_id}", get(get_session).delete(end_combat))
        .route("/{session_id}/turns", post(take_turn))
}
