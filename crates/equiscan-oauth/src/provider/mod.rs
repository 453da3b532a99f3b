//! Authorization server endpoints and per-server quirks.

use crate::error::{Error, Result};
use url::Url;

/// Read access to the mailbox.
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Label changes; needed to remove the `UNREAD` label.
pub const GMAIL_MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// Every scope the scanner asks for.
pub const GMAIL_SCOPES: [&str; 2] = [GMAIL_READONLY_SCOPE, GMAIL_MODIFY_SCOPE];

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// An `OAuth2` authorization server.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Display name, used in logs.
    pub name: String,
    /// Where the user grants consent.
    pub auth_url: Url,
    /// Where codes and refresh tokens are exchanged.
    pub token_url: Url,
    /// Scopes requested when the caller names none.
    pub default_scopes: Vec<String>,
    /// Extra query parameters for the consent URL.
    pub auth_params: Vec<(String, String)>,
}

impl Provider {
    /// Creates a provider with no default scopes.
    ///
    /// # Errors
    ///
    /// Returns an error if either URL does not parse.
    pub fn new(
        name: impl Into<String>,
        auth_url: impl AsRef<str>,
        token_url: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            auth_url: Url::parse(auth_url.as_ref())?,
            token_url: Url::parse(token_url.as_ref())?,
            default_scopes: Vec::new(),
            auth_params: Vec::new(),
        })
    }

    /// Replaces the default scopes.
    #[must_use]
    pub fn with_default_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.default_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a query parameter to every consent URL.
    #[must_use]
    pub fn with_auth_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_params.push((name.into(), value.into()));
        self
    }

    /// Google, asking for the Gmail scopes.
    ///
    /// Google only returns a refresh token when offline access is requested
    /// and the consent screen is shown, so both are forced.
    ///
    /// # Errors
    ///
    /// Returns an error if URL parsing fails.
    pub fn google() -> Result<Self> {
        Ok(Self::new("Google", GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL)?
            .with_default_scopes(GMAIL_SCOPES)
            .with_auth_param("access_type", "offline")
            .with_auth_param("prompt", "consent"))
    }

    /// Checks that both endpoints are HTTP(S) URLs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending endpoint.
    pub fn validate(&self) -> Result<()> {
        for (label, url) in [("auth_url", &self.auth_url), ("token_url", &self.token_url)] {
            if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                return Err(Error::Config(format!(
                    "{label} must be an http(s) URL, got {url}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_google_requests_gmail_scopes_offline() {
        let google = Provider::google().unwrap();
        assert_eq!(google.default_scopes, GMAIL_SCOPES);
        assert_eq!(google.token_url.as_str(), GOOGLE_TOKEN_URL);
        assert!(
            google
                .auth_params
                .contains(&("access_type".to_string(), "offline".to_string()))
        );
        google.validate().unwrap();
    }

    #[test]
    fn test_plain_provider_has_no_extras() {
        let provider =
            Provider::new("Local", "http://127.0.0.1:8080/auth", "http://127.0.0.1:8080/token")
                .unwrap();
        assert!(provider.default_scopes.is_empty());
        assert!(provider.auth_params.is_empty());
        provider.validate().unwrap();
    }

    #[test]
    fn test_unparseable_url() {
        assert!(Provider::new("Bad", "accounts google com", GOOGLE_TOKEN_URL).is_err());
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let provider = Provider::new("Odd", GOOGLE_AUTH_URL, "mailto:tokens@example.com").unwrap();
        let err = provider.validate().unwrap_err();
        assert!(err.to_string().contains("token_url"));
    }
}
