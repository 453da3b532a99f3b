//! Error types for the core library.
//!
//! The pipeline distinguishes three per-message failure classes, each
//! contained by the inbox processor:
//!
//! - [`DecodeError`]: the transport encoding of a raw message is malformed.
//!   The message is skipped and left unread.
//! - [`PersistenceError`]: the scan store is unreachable or rejected the
//!   insert. The message is skipped and left unread so the next poll retries it.
//! - [`CollaboratorError`]: the mail service failed a list, fetch or
//!   acknowledge call. Only a failed listing aborts a poll.

use thiserror::Error;

/// Boxed source error from a mail service implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from setting up and querying a scan store.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// The raw message's transport encoding could not be reversed.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload contains bytes outside the URL-safe Base64 alphabet range.
    #[error("Transport payload is not ASCII (first offending byte at offset {offset})")]
    NotAscii {
        /// Offset of the first non-ASCII byte.
        offset: usize,
    },

    /// The payload is not valid URL-safe Base64.
    #[error("Transport payload is not valid base64url: {0}")]
    Transport(#[from] equiscan_mime::Error),
}

/// A scan record could not be written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Connection, transaction or constraint failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A mail service call failed.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Listing unread messages failed.
    #[error("Listing unread messages failed: {0}")]
    List(#[source] BoxError),

    /// Fetching a raw message failed.
    #[error("Fetching message {id} failed: {source}")]
    Fetch {
        /// Message identifier.
        id: String,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// Clearing the unread marker failed.
    #[error("Clearing unread marker on message {id} failed: {source}")]
    Acknowledge {
        /// Message identifier.
        id: String,
        /// Underlying error.
        #[source]
        source: BoxError,
    },
}
