//! Scan log data model.

use chrono::{DateTime, Local};

use crate::extract::EquipmentId;

/// One row of the scan log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    /// Identifier assigned by the store.
    pub id: i64,
    /// Equipment that was scanned.
    pub equipment_id: EquipmentId,
    /// When the scan was recorded, in the local time zone.
    pub scanned_at: DateTime<Local>,
}
