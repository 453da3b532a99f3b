//! Cached-token authenticator.

use crate::error::{Error, Result};
use crate::flow::OAuthClient;
use crate::store::TokenStore;
use crate::token::Token;

/// Hands out a valid bearer token, refreshing and re-caching it when it
/// expires.
#[derive(Debug)]
pub struct Authenticator {
    client: OAuthClient,
    store: TokenStore,
    token: Token,
}

impl Authenticator {
    /// Creates an authenticator from an already obtained token.
    #[must_use]
    pub const fn new(client: OAuthClient, store: TokenStore, token: Token) -> Self {
        Self {
            client,
            store,
            token,
        }
    }

    /// Loads the token from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] if the cache is empty, or an error if
    /// it cannot be read.
    pub async fn from_cache(client: OAuthClient, store: TokenStore) -> Result<Self> {
        let token = store
            .load()
            .await?
            .ok_or_else(|| Error::NotAuthorized(store.path().to_path_buf()))?;
        Ok(Self::new(client, store, token))
    }

    /// The current token, possibly expired.
    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    /// Returns a bearer token, refreshing it first if it has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh fails or the refreshed token cannot
    /// be cached.
    pub async fn access_token(&mut self) -> Result<String> {
        if self.token.is_expired() {
            tracing::info!("Access token expired, refreshing");
            self.token = self.client.refresh_token(&self.token).await?;
            self.store.save(&self.token).await?;
        }
        Ok(self.token.access_token.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use chrono::{Duration, Utc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_from_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let client = OAuthClient::new("id", Provider::google().unwrap());

        let err = Authenticator::from_cache(client, store).await.unwrap_err();
        assert!(matches!(err, Error::NotAuthorized(_)));
    }

    #[tokio::test]
    async fn test_valid_token_is_not_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = Provider::new("Mock", server.uri(), format!("{}/token", server.uri()))
            .unwrap();
        let token =
            Token::new("current", "Bearer").with_expires_at(Utc::now() + Duration::hours(1));
        let mut auth = Authenticator::new(
            OAuthClient::new("id", provider),
            TokenStore::new(dir.path().join("token.json")),
            token,
        );

        assert_eq!(auth.access_token().await.unwrap(), "current");
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "renewed",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let provider = Provider::new("Mock", server.uri(), format!("{}/token", server.uri()))
            .unwrap();
        let token = Token::new("old", "Bearer")
            .with_refresh_token("r")
            .with_expires_at(Utc::now() - Duration::minutes(5));
        let mut auth = Authenticator::new(OAuthClient::new("id", provider), store.clone(), token);

        assert_eq!(auth.access_token().await.unwrap(), "renewed");
        // Second call uses the fresh token without hitting the server again
        assert_eq!(auth.access_token().await.unwrap(), "renewed");

        let cached = store.load().await.unwrap().unwrap();
        assert_eq!(cached.access_token, "renewed");
        assert_eq!(cached.refresh_token.as_deref(), Some("r"));
    }
}
