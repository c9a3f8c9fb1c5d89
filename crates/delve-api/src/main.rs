//! Delve API server entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use delve_api::config::AppConfig;
use delve_api::state::AppState;
use delve_core::clock::{Clock, SystemClock};
use delve_core::rng::{DeterministicRng, SeededRng};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Delve API server");

    let config = AppConfig::load()?;

    let rng = match config.rng_seed {
        Some(seed) => {
            tracing::info!(seed, "using fixed RNG seed");
            SeededRng::from_seed(seed)
        }
        None => SeededRng::from_entropy(),
    };

    // Build application state.
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let app_state = AppState::new(clock, rng, config.combat.clone());

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = delve_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
