//! Record persistence: the `RecordStore` trait, its row type, and backend selection.

mod postgres;
mod sqlite;

pub use postgres::PgRecordStore;
pub use sqlite::SqliteRecordStore;

use crate::config::{DatabaseTarget, Settings};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Maximum message length in characters (`VARCHAR(255)`).
pub const MESSAGE_MAX_LEN: usize = 255;

/// One row of the `records` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Record {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data access for records. Mutating methods run in a transaction; an error leaves the table untouched.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the `records` table if it does not exist.
    async fn ensure_schema(&self) -> Result<(), AppError>;

    /// All records, newest first.
    async fn list_records(&self) -> Result<Vec<Record>, AppError>;

    /// Insert a record with the trimmed message. Fails with `AppError::Validation` before any write
    /// when the message is empty after trimming or too long.
    async fn create_record(&self, message: &str) -> Result<Record, AppError>;

    async fn get_record(&self, id: i64) -> Result<Option<Record>, AppError>;

    /// Replace the message and refresh `updated_at`. `None` when the id does not exist.
    async fn update_record(&self, id: i64, message: &str) -> Result<Option<Record>, AppError>;

    /// Hard delete. Returns the removed row, or `None` when the id does not exist.
    async fn delete_record(&self, id: i64) -> Result<Option<Record>, AppError>;

    /// Trivial connectivity check (`SELECT 1`).
    async fn ping(&self) -> Result<(), sqlx::Error>;

    async fn close(&self);
}

/// Trim and check a raw message.
pub fn normalize_message(raw: &str) -> Result<String, AppError> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message cannot be empty".into()));
    }
    if message.chars().count() > MESSAGE_MAX_LEN {
        return Err(AppError::Validation(format!(
            "Message must be at most {} characters",
            MESSAGE_MAX_LEN
        )));
    }
    Ok(message.to_string())
}

/// Open the store selected by the settings and make sure the table exists.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn RecordStore>, AppError> {
    let store: Arc<dyn RecordStore> = match &settings.database {
        DatabaseTarget::Postgres(pg) => Arc::new(PgRecordStore::connect(pg).await?),
        DatabaseTarget::InMemory => Arc::new(SqliteRecordStore::in_memory().await?),
    };
    store.ensure_schema().await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_message("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn normalize_rejects_blank() {
        for raw in ["", "   ", "\n\t "] {
            let err = normalize_message(raw).unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == "Message cannot be empty"));
        }
    }

    #[test]
    fn normalize_counts_characters_not_bytes() {
        let at_limit = "é".repeat(MESSAGE_MAX_LEN);
        assert!(normalize_message(&at_limit).is_ok());
        let over = "x".repeat(MESSAGE_MAX_LEN + 1);
        assert!(matches!(normalize_message(&over), Err(AppError::Validation(_))));
    }

    #[test]
    fn record_serializes_to_wire_shape() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = Record {
            id: 7,
            message: "hi".into(),
            created_at: ts,
            updated_at: ts,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["message"], "hi");
        assert_eq!(json["created_at"], "2024-05-01T12:30:00Z");
        assert_eq!(json["created_at"], json["updated_at"]);
    }

    #[tokio::test]
    async fn connect_testing_settings_gives_ready_store() {
        let settings = Settings::from_lookup(Some("testing"), |_| None).unwrap();
        let store = connect(&settings).await.unwrap();
        assert!(store.list_records().await.unwrap().is_empty());
        store.ping().await.unwrap();
    }
}
