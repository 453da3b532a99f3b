//! Postgres scan store.
//!
//! The `entry_log` table may already exist with an `INTEGER` key, so queries
//! cast it on the way out. Timestamps are written and read as
//! `TIMESTAMPTZ`, which keeps the instant whatever the session time zone.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use sqlx::Row;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::debug;

use super::model::ScanRecord;
use super::repository::ScanRecorder;
use crate::Result;
use crate::error::PersistenceError;
use crate::extract::EquipmentId;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Scan log kept in a Postgres database.
#[derive(Debug, Clone)]
pub struct PgScanStore {
    pool: PgPool,
}

impl PgScanStore {
    /// Connects to the server described by `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;
        debug!("Connected to Postgres scan store");
        Ok(Self { pool })
    }

    /// Creates the `entry_log` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS entry_log (
                id SERIAL PRIMARY KEY,
                equipment_id VARCHAR(255) NOT NULL,
                scanned_at TIMESTAMP WITH TIME ZONE NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns the `limit` most recent scans, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent(&self, limit: u32) -> Result<Vec<ScanRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id::BIGINT AS id,
                   equipment_id::TEXT AS equipment_id,
                   scanned_at::TIMESTAMPTZ AS scanned_at
            FROM entry_log
            ORDER BY id DESC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(|row| {
                Ok(ScanRecord {
                    id: row.try_get("id")?,
                    equipment_id: EquipmentId::from_stored(row.try_get("equipment_id")?),
                    scanned_at: row.try_get("scanned_at")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

        Ok(records)
    }
}

#[async_trait]
impl ScanRecorder for PgScanStore {
    async fn insert_scan(
        &self,
        equipment_id: &EquipmentId,
        scanned_at: DateTime<Local>,
    ) -> std::result::Result<i64, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO entry_log (equipment_id, scanned_at) VALUES ($1, $2) RETURNING id::BIGINT",
        )
        .bind(equipment_id.as_str())
        .bind(scanned_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(id)
    }
}
