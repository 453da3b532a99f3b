//! Failures while decoding message data.

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A payload, header or body that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `Content-Type` value without a usable `type/subtype`.
    #[error("malformed Content-Type: {0}")]
    ContentType(String),

    /// RFC 2047 encoded-word with an encoding other than `B` or `Q`.
    #[error("unsupported encoded-word encoding {0:?}")]
    WordEncoding(String),

    /// Standard or URL-safe Base64 that does not decode.
    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),
}
