//! PostgreSQL record store used in development and production.

use super::{normalize_message, Record, RecordStore};
use crate::config::PostgresSettings;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const RECORD_COLUMNS: &str = "id, message, created_at, updated_at";

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the database if it is missing, then open a pool on it.
    pub async fn connect(settings: &PostgresSettings) -> Result<Self, AppError> {
        if let Err(e) = ensure_database_exists(settings).await {
            tracing::warn!(database = %settings.name, error = %e, "could not ensure database exists");
        }
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options(settings, &settings.name)?)
            .await?;
        tracing::info!(host = %settings.host, port = settings.port, database = %settings.name, "connected to postgres");
        Ok(Self::new(pool))
    }
}

/// Options parsed from the settings' connection URL, pointed at `database`.
fn connect_options(settings: &PostgresSettings, database: &str) -> Result<PgConnectOptions, sqlx::Error> {
    Ok(PgConnectOptions::from_str(&settings.database_uri())?.database(database))
}

/// Connects to the `postgres` maintenance database and runs CREATE DATABASE when needed.
async fn ensure_database_exists(settings: &PostgresSettings) -> Result<(), AppError> {
    if settings.name.is_empty() || settings.name == "postgres" {
        return Ok(());
    }
    let mut conn = connect_options(settings, "postgres")?.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&settings.name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&settings.name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %settings.name, "created database");
    }
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id BIGSERIAL PRIMARY KEY,
                message VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
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
            "INSERT INTO records (message, created_at, updated_at) VALUES ($1, $2, $2) RETURNING {}",
            RECORD_COLUMNS
        );
        tracing::debug!(sql = %sql, "query (tx)");
        // An early return drops the transaction, which rolls it back.
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
        let sql = format!("SELECT {} FROM records WHERE id = $1", RECORD_COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Record>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_record(&self, id: i64, message: &str) -> Result<Option<Record>, AppError> {
        let message = normalize_message(message)?;
        let sql = format!(
            "UPDATE records SET message = $1, updated_at = GREATEST($2, created_at) WHERE id = $3 RETURNING {}",
            RECORD_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, Record>(&sql)
            .bind(&message)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn delete_record(&self, id: i64) -> Result<Option<Record>, AppError> {
        let sql = format!("DELETE FROM records WHERE id = $1 RETURNING {}", RECORD_COLUMNS);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PostgresSettings {
        PostgresSettings {
            user: "app@corp".into(),
            password: "p@ss:w/rd".into(),
            host: "db.internal".into(),
            port: 6543,
            name: "records".into(),
        }
    }

    #[test]
    fn connect_options_come_from_database_uri() {
        let opts = connect_options(&settings(), "records").unwrap();
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 6543);
        assert_eq!(opts.get_username(), "app@corp");
        assert_eq!(opts.get_database(), Some("records"));
    }

    #[test]
    fn connect_options_can_target_maintenance_database() {
        let opts = connect_options(&settings(), "postgres").unwrap();
        assert_eq!(opts.get_database(), Some("postgres"));
    }

    #[test]
    fn quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("rec\"ords"), "\"rec\"\"ords\"");
    }
}
