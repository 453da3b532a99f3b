//! Backend selection.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::info;

use super::model::ScanRecord;
use super::postgres::PgScanStore;
use super::repository::ScanRecorder;
use super::sqlite::SqliteScanStore;
use crate::Result;
use crate::config::{DbConfig, DbTarget};
use crate::error::PersistenceError;
use crate::extract::EquipmentId;

/// Scan store chosen from a [`DbConfig`].
#[derive(Debug, Clone)]
pub enum ScanStore {
    /// Postgres backend.
    Postgres(PgScanStore),
    /// `SQLite` backend.
    Sqlite(SqliteScanStore),
}

impl ScanStore {
    /// Connects to the backend `config` points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the connection fails.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let store = match config.target()? {
            DbTarget::Postgres(options) => Self::Postgres(PgScanStore::connect(options).await?),
            DbTarget::Sqlite(url) => Self::Sqlite(SqliteScanStore::connect(&url).await?),
        };
        info!(database = %config, backend = store.backend(), "Scan store ready");
        Ok(store)
    }

    /// Name of the active backend.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Creates the `entry_log` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        match self {
            Self::Postgres(store) => store.ensure_schema().await,
            Self::Sqlite(store) => store.ensure_schema().await,
        }
    }

    /// Returns the `limit` most recent scans, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent(&self, limit: u32) -> Result<Vec<ScanRecord>> {
        match self {
            Self::Postgres(store) => store.recent(limit).await,
            Self::Sqlite(store) => store.recent(limit).await,
        }
    }
}

#[async_trait]
impl ScanRecorder for ScanStore {
    async fn insert_scan(
        &self,
        equipment_id: &EquipmentId,
        scanned_at: DateTime<Local>,
    ) -> std::result::Result<i64, PersistenceError> {
        match self {
            Self::Postgres(store) => store.insert_scan(equipment_id, scanned_at).await,
            Self::Sqlite(store) => store.insert_scan(equipment_id, scanned_at).await,
        }
    }
}
