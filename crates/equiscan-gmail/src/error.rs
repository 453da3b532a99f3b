//! Error types for the Gmail client.

use thiserror::Error;

/// Errors that can occur talking to the Gmail API.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No usable access token.
    #[error("Authorization failed: {0}")]
    Auth(#[from] equiscan_oauth::Error),

    /// The API answered with an error status.
    #[error("Gmail API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// A `raw` format fetch returned no payload.
    #[error("Message {0} has no raw payload")]
    MissingRaw(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
