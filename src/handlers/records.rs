//! Record handlers: list, create, read, delete.

use crate::error::AppError;
use crate::response::success_message;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub const RECORD_NOT_FOUND: &str = "Record not found";
pub const RESOURCE_NOT_FOUND: &str = "Resource not found";

/// Path ids are non-negative integers; anything else does not name a record route.
fn parse_id(id_str: &str) -> Result<i64, AppError> {
    if id_str.is_empty() || !id_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::NotFound(RESOURCE_NOT_FOUND.into()));
    }
    id_str
        .parse()
        .map_err(|_| AppError::NotFound(RESOURCE_NOT_FOUND.into()))
}

/// Pull `message` out of the request body. A missing or unparsable body counts as a missing field.
fn message_from_body(body: Option<&Value>) -> Result<&str, AppError> {
    match body.and_then(|b| b.get("message")) {
        None => Err(AppError::Validation("Message is required".into())),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(AppError::Validation("Message must be a string".into())),
    }
}

/// GET /api/records
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let records = state.store.list_records().await?;
    Ok(Json(records))
}

/// POST /api/records
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = match body {
        Ok(Json(v)) => Some(v),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(AppError::PayloadTooLarge);
        }
        Err(_) => None,
    };
    let message = message_from_body(body.as_ref())?;
    let record = state.store.create_record(message).await?;
    tracing::info!(id = record.id, "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/records/:id
pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let record = state
        .store
        .get_record(id)
        .await?
        .ok_or_else(|| AppError::NotFound(RECORD_NOT_FOUND.into()))?;
    Ok(Json(record))
}

/// DELETE /api/records/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    state
        .store
        .delete_record(id)
        .await?
        .ok_or_else(|| AppError::NotFound(RECORD_NOT_FOUND.into()))?;
    tracing::info!(id, "record deleted");
    Ok(Json(success_message(format!("Record {} deleted successfully", id))))
}
