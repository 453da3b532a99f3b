//! Token endpoint client and the consent flow built on it.

mod code;
mod pkce;

pub use code::{AuthorizationCodeFlow, extract_code};
pub use pkce::PkceChallenge;

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::token::{ErrorResponse, Token, TokenResponse};
use reqwest::Client;

/// Form body of a token endpoint request.
type Form<'a> = Vec<(&'static str, &'a str)>;

/// A registered OAuth client and the provider it talks to.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// Client ID issued by the provider.
    pub client_id: String,
    /// Client secret; installed apps may have none.
    pub client_secret: Option<String>,
    /// Redirect URI registered for the consent step.
    pub redirect_uri: Option<String>,
    /// Endpoints and defaults.
    pub provider: Provider,
    http: Client,
}

impl OAuthClient {
    /// Creates a public client (no secret, no redirect URI).
    #[must_use]
    pub fn new(client_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            provider,
            http: Client::new(),
        }
    }

    /// Adds a client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Adds a redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Mints a new access token from `token`'s refresh token.
    ///
    /// The refresh token and granted scope carry over when the response
    /// leaves them out, as Google's does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] if `token` cannot be refreshed, or
    /// the server's error if it rejects the grant.
    #[tracing::instrument(skip_all, fields(provider = %self.provider.name))]
    pub async fn refresh_token(&self, token: &Token) -> Result<Token> {
        let mut form: Form<'_> = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token()?),
        ];
        self.add_credentials(&mut form);

        let mut renewed = self.post_form(&form).await?;
        if renewed.refresh_token.is_none() {
            renewed.refresh_token.clone_from(&token.refresh_token);
        }
        if renewed.scope.is_none() {
            renewed.scope.clone_from(&token.scope);
        }

        tracing::debug!(expires_at = ?renewed.expires_at, "Access token refreshed");
        Ok(renewed)
    }

    /// Redeems an authorization code. `redirect_uri` falls back to the
    /// client's own.
    pub(crate) async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
        code_verifier: Option<&str>,
    ) -> Result<Token> {
        let mut form: Form<'_> = vec![("grant_type", "authorization_code"), ("code", code)];
        self.add_credentials(&mut form);
        form.extend(
            redirect_uri
                .or(self.redirect_uri.as_deref())
                .map(|uri| ("redirect_uri", uri)),
        );
        form.extend(code_verifier.map(|verifier| ("code_verifier", verifier)));

        self.post_form(&form).await
    }

    fn add_credentials<'a>(&'a self, form: &mut Form<'a>) {
        form.push(("client_id", &self.client_id));
        form.extend(self.client_secret.as_deref().map(|secret| ("client_secret", secret)));
    }

    async fn post_form(&self, form: &Form<'_>) -> Result<Token> {
        let response = self
            .http
            .post(self.provider.token_url.clone())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: TokenResponse = response.json().await?;
            return Ok(Token::from_response(body));
        }

        // Proxies and outages answer with HTML rather than an RFC 6749 body
        let text = response.text().await?;
        Err(match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => body.into_error(),
            Err(_) => Error::oauth_error(status.as_str(), text),
        })
    }
}
