//! Scan recorder capability.

use async_trait::async_trait;
use chrono::{DateTime, Local};

use super::model::ScanRecord;
use crate::error::PersistenceError;
use crate::extract::EquipmentId;

/// Durable append-only log of equipment scans.
#[async_trait]
pub trait ScanRecorder: Send + Sync {
    /// Inserts one scan and returns the identifier the store assigned.
    ///
    /// The row is committed before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or rejects the row.
    async fn insert_scan(
        &self,
        equipment_id: &EquipmentId,
        scanned_at: DateTime<Local>,
    ) -> Result<i64, PersistenceError>;

    /// Records a scan of `equipment_id` at the current local time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or rejects the row.
    async fn record(&self, equipment_id: &EquipmentId) -> Result<ScanRecord, PersistenceError> {
        let scanned_at = Local::now();
        let id = self.insert_scan(equipment_id, scanned_at).await?;
        Ok(ScanRecord {
            id,
            equipment_id: equipment_id.clone(),
            scanned_at,
        })
    }
}
