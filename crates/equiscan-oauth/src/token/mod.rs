//! Access tokens and the token endpoint's responses.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens this many seconds from expiry are treated as already expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Bearer token as cached between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Value for the `Authorization: Bearer` header.
    pub access_token: String,
    /// Token type reported by the server, normally `Bearer`.
    pub token_type: String,
    /// Absolute expiry; `None` when the server gave no lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Long-lived token used to mint new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Space-separated scopes granted at consent time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Token {
    /// Creates a token with no expiry, refresh token or scope.
    #[must_use]
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at: None,
            refresh_token: None,
            scope: None,
        }
    }

    /// Builds a token from a token endpoint response received now.
    #[must_use]
    pub fn from_response(response: TokenResponse) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(i64::from(secs)));

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
            refresh_token: response.refresh_token,
            scope: response.scope,
        }
    }

    /// Whether the token expires within the next minute.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= at)
    }

    /// Opposite of [`Token::is_expired`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the expiry.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the granted scopes.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// The refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] if the server never issued one.
    pub fn refresh_token(&self) -> Result<&str> {
        self.refresh_token.as_deref().ok_or(Error::NoRefreshToken)
    }

    /// Granted scopes, one per item.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }

    /// Scopes from `required` that were not granted.
    ///
    /// A token with no recorded scope is assumed to cover everything, since
    /// servers may omit `scope` when it equals the request.
    #[must_use]
    pub fn missing_scopes<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        if self.scope.is_none() {
            return Vec::new();
        }
        required
            .iter()
            .copied()
            .filter(|needed| !self.scopes().any(|granted| granted == *needed))
            .collect()
    }
}

/// Successful token endpoint response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type.
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,
    /// Refresh token; Google only sends it on the first exchange.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Space-separated granted scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Error body of the token endpoint (RFC 6749 section 5.2).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error code such as `invalid_grant`.
    pub error: String,
    /// Optional explanation.
    #[serde(default)]
    pub error_description: String,
}

impl ErrorResponse {
    /// Converts to [`Error::OAuth`].
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::oauth_error(self.error, self.error_description)
    }
}
