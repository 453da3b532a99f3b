//! Google client secrets (`credentials.json`).
//!
//! The file downloaded from the Google Cloud console wraps the client
//! configuration in an `installed` or `web` object:
//!
//! ```text
//! {"installed": {"client_id": "...", "client_secret": "...",
//!                "auth_uri": "...", "token_uri": "...",
//!                "redirect_uris": ["http://localhost"]}}
//! ```

use crate::error::{Error, Result};
use crate::flow::OAuthClient;
use crate::provider::Provider;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

/// OAuth client configuration issued by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    /// Client ID.
    pub client_id: String,
    /// Client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Authorization endpoint, when it differs from Google's default.
    #[serde(default)]
    pub auth_uri: Option<String>,
    /// Token endpoint, when it differs from Google's default.
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Registered redirect URIs; the first one is used.
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl ClientSecrets {
    /// Parses a secrets document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has neither an
    /// `installed` nor a `web` section.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(json)?;
        file.installed.or(file.web).ok_or_else(|| {
            Error::Config("client secrets have no `installed` or `web` section".into())
        })
    }

    /// Reads and parses a secrets file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    /// Builds an OAuth client for Google with these secrets.
    ///
    /// # Errors
    ///
    /// Returns an error if a custom endpoint URL is invalid.
    pub fn into_client(self) -> Result<OAuthClient> {
        let mut provider = Provider::google()?;
        if let Some(auth_uri) = &self.auth_uri {
            provider.auth_url = auth_uri.parse()?;
        }
        if let Some(token_uri) = &self.token_uri {
            provider.token_url = token_uri.parse()?;
        }

        let mut client = OAuthClient::new(self.client_id, provider);
        if let Some(secret) = self.client_secret {
            client = client.with_client_secret(secret);
        }
        if let Some(uri) = self.redirect_uris.into_iter().next() {
            client = client.with_redirect_uri(uri);
        }
        Ok(client)
    }
}
