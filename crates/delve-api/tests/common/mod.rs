//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use delve_api::state::AppState;
use delve_combat::domain::rules::CombatRules;
use delve_core::clock::Clock;
use delve_core::rng::DeterministicRng;
use delve_test_support::{SequenceRng, fixed_clock};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build state with a deterministic clock and a scripted `SequenceRng`.
/// Keep the state to send several requests against the same sessions.
pub fn test_state_with_rng(rng: SequenceRng, rules: CombatRules) -> AppState {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(fixed_clock());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    AppState::new(clock, rng, rules)
}

/// Build the full app router over `state`. Uses the same route structure as
/// `main.rs`.
pub fn build_test_app(state: &AppState) -> Router {
    delve_api::build_router(state.clone())
}

/// Send `request` and decode the JSON body.
async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// POST `body` as JSON to `uri`.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// GET `uri`.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

/// DELETE `uri`, returning only the status.
pub async fn delete(app: Router, uri: &str) -> StatusCode {
    let request = Request::delete(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap().status()
}
