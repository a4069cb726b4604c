//! SQLite store for monitoring configuration.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;
use token_monitor_core::{MonitorConfig, PriceBand};
use token_monitor_engine::{MonitorStore, StoreError};
use tracing::debug;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Invalid stored band for {symbol}: {reason}")]
    InvalidRow { symbol: String, reason: String },
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        StoreError(e.to_string())
    }
}

type ConfigRow = (String, f64, f64, String);

fn config_from_row((symbol, low, high, chat_id): ConfigRow) -> Result<MonitorConfig, DbError> {
    let band = PriceBand::new(low, high).map_err(|e| DbError::InvalidRow {
        symbol: symbol.clone(),
        reason: e.to_string(),
    })?;
    Ok(MonitorConfig::new(&symbol, band, chat_id))
}

/// Database connection for monitoring configs.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the SQLite database at the given URL, creating it if missing.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        // Every in-memory connection is its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        debug!(url = database_url, "Database ready");
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), DbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS monitor_config (
                symbol TEXT PRIMARY KEY,
                low REAL NOT NULL,
                high REAL NOT NULL,
                chat_id TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the config for a symbol.
    pub async fn get_config(&self, symbol: &str) -> Result<Option<MonitorConfig>, DbError> {
        let row = sqlx::query_as::<_, ConfigRow>(
            "SELECT symbol, low, high, chat_id FROM monitor_config WHERE symbol = ?",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        row.map(config_from_row).transpose()
    }

    /// Insert or replace the config for `config.symbol` in one statement.
    pub async fn upsert_config(&self, config: &MonitorConfig) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO monitor_config (symbol, low, high, chat_id, updated_at)
            VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(symbol) DO UPDATE SET
                low = excluded.low,
                high = excluded.high,
                chat_id = excluded.chat_id,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(config.symbol.as_str())
        .bind(config.band.low())
        .bind(config.band.high())
        .bind(&config.chat_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a symbol's config. Returns whether a row was removed.
    pub async fn delete_config(&self, symbol: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM monitor_config WHERE symbol = ?")
            .bind(symbol)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All configs ordered by symbol.
    pub async fn list_configs(&self) -> Result<Vec<MonitorConfig>, DbError> {
        let rows = sqlx::query_as::<_, ConfigRow>(
            "SELECT symbol, low, high, chat_id FROM monitor_config ORDER BY symbol",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(config_from_row).collect()
    }
}

#[async_trait]
impl MonitorStore for Database {
    async fn get(&self, symbol: &str) -> Result<Option<MonitorConfig>, StoreError> {
        Ok(self.get_config(symbol).await?)
    }

    async fn upsert(&self, config: &MonitorConfig) -> Result<(), StoreError> {
        Ok(self.upsert_config(config).await?)
    }

    async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        Ok(self.delete_config(symbol).await?)
    }

    async fn list(&self) -> Result<Vec<MonitorConfig>, StoreError> {
        Ok(self.list_configs().await?)
    }
}
