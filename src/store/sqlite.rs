//! In-memory SQLite record store for testing mode.

use super::{normalize_message, Record, RecordStore};
use crate::config::DatabaseTarget;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;

const RECORD_COLUMNS: &str = "id, message, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fresh, isolated database. Every connection to `sqlite::memory:` opens its own database,
    /// so the pool holds exactly one connection that never expires.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect(DatabaseTarget::IN_MEMORY_URI)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message VARCHAR(255) NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<Record>, AppError> {
        let sql = format!(
            "SELECT {} FROM records ORDER BY created_at DESC, id DESC",
            RECORD_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, Record>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn create_record(&self, message: &str) -> Result<Record, AppError> {
        let message = normalize_message(message)?;
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO records (message, created_at, updated_at) VALUES (?1, ?2, ?2) RETURNING {}",
            RECORD_COLUMNS
        );
        tracing::debug!(sql = %sql, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let record = sqlx::query_as::<_, Record>(&sql)
            .bind(&message)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn get_record(&self, id: i64) -> Result<Option<Record>, AppError> {
        let sql = format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Record>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_record(&self, id: i64, message: &str) -> Result<Option<Record>, AppError> {
        let message = normalize_message(message)?;
        let mut tx = self.pool.begin().await?;
        let Some(current) = sqlx::query_as::<_, Record>(&format!(
            "SELECT {} FROM records WHERE id = ?1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };
        let updated_at = Utc::now().max(current.created_at);
        let sql = format!(
            "UPDATE records SET message = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {}",
            RECORD_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query (tx)");
        let row = sqlx::query_as::<_, Record>(&sql)
            .bind(&message)
            .bind(updated_at)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn delete_record(&self, id: i64) -> Result<Option<Record>, AppError> {
        let sql = format!("DELETE FROM records WHERE id = ?1 RETURNING {}", RECORD_COLUMNS);
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, Record>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
