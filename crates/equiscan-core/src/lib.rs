//! # equiscan-core
//!
//! Turns unread inbox messages into equipment scan records.
//!
//! This crate provides:
//! - Equipment identifier extraction
//! - Raw message decoding (transport layer and MIME)
//! - Scan recording (Postgres and `SQLite`)
//! - The inbox processor that ties them together
//!
//! The mail service and the scan store are consumed through the
//! [`MailSession`] and [`ScanRecorder`] traits, so the processor never sees
//! credentials or connection details.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod decode;
mod error;
pub mod extract;
pub mod mail;
pub mod processor;
pub mod scan;

pub use config::{DbConfig, DbTarget};
pub use decode::{DecodedMessage, decode};
pub use error::{BoxError, CollaboratorError, DecodeError, Error, PersistenceError, Result};
pub use extract::{EquipmentId, extract};
pub use mail::{MailSession, MessageHandle, RawMessage};
pub use processor::{BatchReport, InboxProcessor, MessageReport, Outcome};
pub use scan::{PgScanStore, ScanRecord, ScanRecorder, ScanStore, SqliteScanStore};
