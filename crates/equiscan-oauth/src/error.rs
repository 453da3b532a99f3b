//! Errors raised while authorizing against Google.

use std::io;
use std::path::PathBuf;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Authorization, token refresh or token cache failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing the token cache or client secrets failed.
    #[error("file access failed: {0}")]
    Io(#[from] io::Error),

    /// The token endpoint could not be reached.
    #[error("token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A cache or secrets file is not valid JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The authorization server refused the request.
    #[error("authorization server returned {error}: {description}")]
    OAuth {
        /// RFC 6749 error code such as `invalid_grant`, or the HTTP status.
        error: String,
        /// Server-supplied detail.
        description: String,
    },

    /// The token has expired and cannot be renewed.
    #[error("token has no refresh token")]
    NoRefreshToken,

    /// Nothing cached yet; the consent flow has not been run.
    #[error("no cached token at {}; run the authorize command first", .0.display())]
    NotAuthorized(PathBuf),

    /// The pasted authorization response holds no usable code.
    #[error("authorization code: {0}")]
    InvalidCode(String),

    /// Client secrets or provider endpoints are unusable.
    #[error("OAuth configuration: {0}")]
    Config(String),

    /// An endpoint is not a URL.
    #[error("bad endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Builds [`Error::OAuth`].
    #[must_use]
    pub fn oauth_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }
}
