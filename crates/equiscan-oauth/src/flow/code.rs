//! Consent step: authorization URL and code exchange.

use super::{OAuthClient, PkceChallenge};
use crate::error::{Error, Result};
use crate::token::Token;
use url::Url;

/// One run of the authorization code grant (RFC 6749 section 4.1).
///
/// The user opens [`AuthorizationCodeFlow::authorization_url`] in a browser,
/// grants access, and hands the resulting code back to
/// [`AuthorizationCodeFlow::exchange_code`]. With PKCE enabled the same
/// flow value must be used for both steps, since it holds the verifier.
#[derive(Debug)]
pub struct AuthorizationCodeFlow {
    client: OAuthClient,
    pkce: Option<PkceChallenge>,
}

impl AuthorizationCodeFlow {
    /// Starts a flow without PKCE.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client, pkce: None }
    }

    /// Generates a PKCE challenge for this flow.
    #[must_use]
    pub fn with_pkce(mut self) -> Self {
        self.pkce = Some(PkceChallenge::generate());
        self
    }

    /// Consent URL for `scopes`, or the provider defaults when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider endpoints are not HTTP(S) URLs.
    pub fn authorization_url(&self, scopes: Option<&[String]>, state: Option<&str>) -> Result<Url> {
        let provider = &self.client.provider;
        provider.validate()?;

        let scope = scopes
            .unwrap_or(provider.default_scopes.as_slice())
            .join(" ");

        let mut url = provider.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client.client_id)
            .extend_pairs(
                self.client
                    .redirect_uri
                    .iter()
                    .map(|uri| ("redirect_uri", uri.as_str())),
            )
            .extend_pairs((!scope.is_empty()).then_some(("scope", scope.as_str())))
            .extend_pairs(state.map(|state| ("state", state)))
            .extend_pairs(self.pkce.iter().flat_map(|pkce| {
                [
                    ("code_challenge", pkce.challenge()),
                    ("code_challenge_method", pkce.method()),
                ]
            }))
            .extend_pairs(
                provider
                    .auth_params
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            );

        Ok(url)
    }

    /// Trades the code from the consent redirect for tokens.
    ///
    /// `redirect_uri` must match the one in the consent URL; `None` uses the
    /// client's.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint rejects the code.
    pub async fn exchange_code(&self, code: &str, redirect_uri: Option<&str>) -> Result<Token> {
        let verifier = self.pkce_verifier();
        self.client.exchange_code(code, redirect_uri, verifier).await
    }

    /// PKCE verifier, if PKCE is enabled.
    #[must_use]
    pub fn pkce_verifier(&self) -> Option<&str> {
        self.pkce.as_ref().map(PkceChallenge::verifier)
    }
}

/// Extracts the authorization code from user input.
///
/// Accepts either the bare code or the whole redirect URL the browser
/// landed on (`http://localhost/?code=...&scope=...`).
///
/// # Errors
///
/// Returns an error if the input is empty, or is a URL that carries an
/// `error` parameter or no `code` parameter.
pub fn extract_code(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidCode("empty authorization code".into()));
    }

    let Ok(url) = Url::parse(input) else {
        return Ok(input.to_string());
    };

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => return Err(Error::oauth_error(value.into_owned(), "consent was not granted")),
            _ => {}
        }
    }

    code.ok_or_else(|| Error::InvalidCode("redirect URL has no code parameter".into()))
}
