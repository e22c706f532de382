//! Health handlers: backend, database, and combined system status.

use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl HealthStatus {
    fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: "healthy",
            timestamp: Utc::now(),
            message: message.into(),
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy",
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct SystemHealth {
    pub backend: HealthStatus,
    pub database: HealthStatus,
}

/// Always healthy once a request reaches the handler.
pub fn backend_health() -> HealthStatus {
    HealthStatus::healthy("Backend API is operational")
}

/// Check storage connectivity. Failures are reported in the body with the underlying error text.
pub async fn database_health(state: &AppState) -> HealthStatus {
    match state.store.ping().await {
        Ok(()) => HealthStatus::healthy("Database connection is established"),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            HealthStatus::unhealthy(format!("Database error: {}", e))
        }
    }
}

/// GET /api/health
pub async fn health() -> Json<HealthStatus> {
    Json(backend_health())
}

/// GET /api/health/database
pub async fn database(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(database_health(&state).await)
}

/// GET /api/health/system
pub async fn system(State(state): State<AppState>) -> Json<SystemHealth> {
    Json(SystemHealth {
        backend: backend_health(),
        database: database_health(&state).await,
    })
}
