//! # equiscan-gmail
//!
//! Gmail REST API client implementing the
//! [`MailSession`](equiscan_core::MailSession) capability.
//!
//! Only the three calls the inbox processor needs are covered: listing
//! unread inbox messages, fetching a message in `raw` format, and removing
//! the `UNREAD` label.
//!
//! ## Quick Start
//!
//! ```ignore
//! use equiscan_gmail::GmailSession;
//! use equiscan_oauth::{Authenticator, ClientSecrets, TokenStore};
//!
//! let client = ClientSecrets::load("credentials.json").await?.into_client()?;
//! let auth = Authenticator::from_cache(client, TokenStore::new("token.json")).await?;
//! let session = GmailSession::new(auth);
//!
//! for id in session.list_unread_ids(20).await? {
//!     let raw = session.get_raw(&id).await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MAX_RESULTS, GmailSession};
pub use error::{Error, Result};
