//! Delve API: HTTP surface over combat sessions.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

/// Builds the application router with every route mounted.
pub fn build_router(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/combat", routes::combat::router())
        .with_state(state)
}
