//! Scan log storage.
//!
//! Every equipment identifier found in the inbox becomes one row in the
//! `entry_log` table. Postgres is the production backend; `SQLite` serves
//! local runs and tests.

mod model;
mod postgres;
mod repository;
mod sqlite;
mod store;

pub use model::ScanRecord;
pub use postgres::PgScanStore;
pub use repository::ScanRecorder;
pub use sqlite::SqliteScanStore;
pub use store::ScanStore;
