//! # equiscan-mime
//!
//! MIME message parsing for raw mail payloads.
//!
//! ## Features
//!
//! - **Message parsing**: Parse RFC 5322 messages with nested multipart support
//! - **Transport decoding**: URL-safe Base64 as delivered by mail REST APIs
//! - **Transfer encodings**: Base64 and Quoted-Printable part bodies
//! - **Header decoding**: RFC 2047 encoded-words
//!
//! ## Quick Start
//!
//! ```ignore
//! use equiscan_mime::{Message, encoding::decode_base64_url};
//!
//! let bytes = decode_base64_url(raw_from_api)?;
//! let message = Message::parse(&bytes);
//!
//! println!("Subject: {}", message.subject().unwrap_or_default());
//! for part in message.walk() {
//!     if part.content_type().is_text_plain() {
//!         println!("{}", part.decode_text_lossy());
//!         break;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Message, Part, TransferEncoding};
