//! Health routes: backend, database check, and combined system status.

use crate::handlers::health::{database, health, system};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/database", get(database))
        .route("/health/system", get(system))
        .with_state(state)
}
