use super::{OutcomeRecord, OutputHandler};
use crate::error::{Error, Result};
use crate::outcome::FetchOutcome;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;

/// Appends one row per outcome to a SQLite table, creating it on first write.
pub struct SqliteOutput {
    pool: SqlitePool,
    table_name: String,
    initialized: bool,
}

impl SqliteOutput {
    pub async fn new(path: PathBuf, table_name: String) -> Result<Self> {
        let conn_str = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&conn_str).await
            .map_err(Error::Database)?;

        Ok(Self {
            pool,
            table_name,
            initialized: false,
        })
    }

    async fn ensure_table(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                sequence_index INTEGER NOT NULL,
                identifier TEXT NOT NULL,
                succeeded INTEGER NOT NULL,
                status_code INTEGER,
                error TEXT,
                final_url TEXT,
                elapsed_ms INTEGER NOT NULL,
                bytes INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )",
            self.table_name
        );

        sqlx::query(&query).execute(&self.pool).await?;

        self.initialized = true;
        Ok(())
    }
}

#[async_trait]
impl OutputHandler for SqliteOutput {
    async fn write(&mut self, outcome: &FetchOutcome) -> Result<()> {
        self.ensure_table().await?;
        let record = OutcomeRecord::new(outcome);

        let query = format!(
            "INSERT INTO {} (sequence_index, identifier, succeeded, status_code, error, final_url, elapsed_ms, bytes, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            self.table_name
        );

        sqlx::query(&query)
            .bind(record.sequence_index as i64)
            .bind(record.identifier)
            .bind(record.succeeded)
            .bind(record.status_code.map(i64::from))
            .bind(record.error)
            .bind(record.final_url)
            .bind(record.elapsed_ms as i64)
            .bind(record.bytes as i64)
            .bind(record.recorded_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
