//! Gmail API request and response bodies.

use serde::{Deserialize, Serialize};

/// Label of messages in the inbox.
pub const LABEL_INBOX: &str = "INBOX";

/// Label of unread messages.
pub const LABEL_UNREAD: &str = "UNREAD";

/// Response of `users.messages.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    /// Matching messages. Absent when nothing matches.
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    /// Token for the next page, if any.
    #[serde(default)]
    pub next_page_token: Option<String>,
    /// Estimated total number of matches.
    #[serde(default)]
    pub result_size_estimate: Option<u32>,
}

/// Message reference inside a list response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    /// Message identifier.
    pub id: String,
    /// Thread identifier.
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Response of `users.messages.get` with `format=raw`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessageResponse {
    /// Message identifier.
    pub id: String,
    /// URL-safe Base64 encoded RFC 5322 message.
    #[serde(default)]
    pub raw: Option<String>,
    /// Labels currently on the message.
    #[serde(default)]
    pub label_ids: Vec<String>,
}

/// Body of `users.messages.modify`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyMessageRequest<'a> {
    /// Labels to add.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_label_ids: Vec<&'a str>,
    /// Labels to remove.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_label_ids: Vec<&'a str>,
}

impl ModifyMessageRequest<'_> {
    /// Request that removes the `UNREAD` label.
    #[must_use]
    pub fn mark_read() -> Self {
        Self {
            add_label_ids: Vec::new(),
            remove_label_ids: vec![LABEL_UNREAD],
        }
    }
}

/// Error body returned by Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Details of an API error.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// HTTP status code.
    #[serde(default)]
    pub code: u16,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status name, e.g. `PERMISSION_DENIED`.
    #[serde(default)]
    pub status: Option<String>,
}
