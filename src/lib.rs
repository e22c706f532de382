//! Records API: a small REST backend for short text records.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{CorsOrigins, DatabaseTarget, Environment, PostgresSettings, Settings};
pub use error::{AppError, ConfigError};
pub use response::{error_body, success_message};
pub use routes::{api_routes, build_app, health_routes, record_routes};
pub use state::AppState;
pub use store::{connect, PgRecordStore, Record, RecordStore, SqliteRecordStore};
