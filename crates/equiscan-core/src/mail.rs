//! Mail service capability consumed by the inbox processor.

use async_trait::async_trait;

use crate::error::CollaboratorError;

/// Reference to one message in the remote mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    /// Provider message identifier.
    pub id: String,
}

impl MessageHandle {
    /// Creates a handle.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A message as fetched from the provider, still transport-encoded.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Provider message identifier.
    pub id: String,
    /// URL-safe Base64 encoding of the RFC 5322 message.
    pub raw: Vec<u8>,
}

/// An authenticated mailbox session.
///
/// Credentials are owned by the implementation; callers never see or
/// refresh them.
#[async_trait]
pub trait MailSession: Send + Sync {
    /// Lists up to `max_results` unread inbox messages.
    async fn list_unread(&self, max_results: u32) -> Result<Vec<MessageHandle>, CollaboratorError>;

    /// Fetches the raw, transport-encoded message.
    async fn fetch_raw(&self, handle: &MessageHandle) -> Result<RawMessage, CollaboratorError>;

    /// Clears the unread marker, signalling the message has been processed.
    async fn clear_unread(&self, handle: &MessageHandle) -> Result<(), CollaboratorError>;
}
