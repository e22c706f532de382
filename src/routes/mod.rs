//! Router assembly: record and health routes under `/api`, CORS, fallbacks, and middleware.

mod health;
mod records;

pub use health::health_routes;
pub use records::record_routes;

use crate::config::{CorsOrigins, Settings};
use crate::error::{ConfigError, INTERNAL_ERROR_MESSAGE};
use crate::handlers::records::RESOURCE_NOT_FOUND;
use crate::response::error_body;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;

pub const API_PREFIX: &str = "/api";

pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Routes under `/api` with the CORS policy from settings.
pub fn api_routes(state: AppState, settings: &Settings) -> Result<Router, ConfigError> {
    Ok(Router::new()
        .merge(record_routes(state.clone()))
        .merge(health_routes(state))
        .fallback(not_found)
        .layer(cors_layer(&settings.cors_origins)?))
}

/// Full application router.
pub fn build_app(state: AppState, settings: &Settings) -> Result<Router, ConfigError> {
    Ok(Router::new()
        .nest(API_PREFIX, api_routes(state, settings)?)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http()))
}

pub fn cors_layer(origins: &CorsOrigins) -> Result<CorsLayer, ConfigError> {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => {
            let values = list
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|e| ConfigError::Invalid {
                        var: "CORS_ORIGINS",
                        reason: format!("{}: {}", o, e),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(values)
        }
    };
    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(CorsAny)
        .allow_headers(CorsAny))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(error_body(RESOURCE_NOT_FOUND)))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(error_body(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}
