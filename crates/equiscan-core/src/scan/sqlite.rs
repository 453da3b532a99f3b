//! `SQLite` scan store.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::debug;

use super::model::ScanRecord;
use super::repository::ScanRecorder;
use crate::Result;
use crate::error::PersistenceError;
use crate::extract::EquipmentId;

/// Scan log kept in a `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteScanStore {
    pool: SqlitePool,
}

impl SqliteScanStore {
    /// Opens the database at `url`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the connection fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        debug!(url, "Connected to SQLite scan store");
        Ok(Self { pool })
    }

    /// Creates an in-memory store with the schema in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        // A single connection, since each in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
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
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipment_id TEXT NOT NULL,
                scanned_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_entry_log_equipment ON entry_log(equipment_id)")
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
            SELECT id, equipment_id, scanned_at
            FROM entry_log
            ORDER BY id DESC
            LIMIT ?
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
impl ScanRecorder for SqliteScanStore {
    async fn insert_scan(
        &self,
        equipment_id: &EquipmentId,
        scanned_at: DateTime<Local>,
    ) -> std::result::Result<i64, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO entry_log (equipment_id, scanned_at) VALUES (?, ?) RETURNING id",
        )
        .bind(equipment_id.as_str())
        .bind(scanned_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(id)
    }
}
