//! Record CRUD routes.

use crate::handlers::records::{create, delete as delete_handler, list, read};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn record_routes(state: AppState) -> Router {
    Router::new()
        .route("/records", get(list).post(create))
        .route("/records/:id", get(read).delete(delete_handler))
        .with_state(state)
}
