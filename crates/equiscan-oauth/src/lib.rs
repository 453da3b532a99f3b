//! # equiscan-oauth
//!
//! `OAuth2` authorization for the Gmail REST API.
//!
//! ## Features
//!
//! - **Authorization Code Flow** with PKCE, for the one-time consent step
//! - **Token management**: expiration checking and refresh
//! - **Token cache**: JSON file that survives restarts
//! - **Client secrets**: loads Google's installed-app `credentials.json`
//!
//! ## Quick Start
//!
//! ### First-time consent
//!
//! ```ignore
//! use equiscan_oauth::{AuthorizationCodeFlow, ClientSecrets, TokenStore};
//!
//! let client = ClientSecrets::load("credentials.json").await?.into_client()?;
//! let flow = AuthorizationCodeFlow::new(client).with_pkce();
//! println!("Visit: {}", flow.authorization_url(None, Some("state"))?);
//!
//! let token = flow.exchange_code(&code, None).await?;
//! TokenStore::new("token.json").save(&token).await?;
//! ```
//!
//! ### Using the cached token
//!
//! ```ignore
//! use equiscan_oauth::Authenticator;
//!
//! let mut auth = Authenticator::from_cache(client, TokenStore::new("token.json")).await?;
//! let bearer = auth.access_token().await?; // refreshed when expired
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod authenticator;
mod error;
pub mod flow;
pub mod provider;
pub mod secrets;
pub mod store;
pub mod token;

pub use authenticator::Authenticator;
pub use error::{Error, Result};
pub use flow::{AuthorizationCodeFlow, OAuthClient, PkceChallenge};
pub use provider::Provider;
pub use secrets::ClientSecrets;
pub use store::TokenStore;
pub use token::Token;
