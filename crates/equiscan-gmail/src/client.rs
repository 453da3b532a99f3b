//! Gmail REST session.

use async_trait::async_trait;
use equiscan_core::{CollaboratorError, MailSession, MessageHandle, RawMessage};
use equiscan_oauth::Authenticator;
use reqwest::{Client, Response};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{
    ApiErrorResponse, LABEL_INBOX, LABEL_UNREAD, ListMessagesResponse, ModifyMessageRequest,
    RawMessageResponse,
};

/// Production Gmail API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com";

/// Batch size used when the caller does not choose one.
pub const DEFAULT_MAX_RESULTS: u32 = 20;

/// Authenticated session against one Gmail mailbox.
#[derive(Debug)]
pub struct GmailSession {
    http: Client,
    base_url: String,
    user_id: String,
    auth: Mutex<Authenticator>,
}

impl GmailSession {
    /// Creates a session for the authorized user's own mailbox.
    #[must_use]
    pub fn new(auth: Authenticator) -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: "me".to_string(),
            auth: Mutex::new(auth),
        }
    }

    /// Points the session at another endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/gmail/v1/users/{}/messages", self.base_url, self.user_id)
    }

    async fn bearer(&self) -> Result<String> {
        Ok(self.auth.lock().await.access_token().await?)
    }

    /// Lists the ids of up to `max_results` unread inbox messages.
    ///
    /// # Errors
    ///
    /// Returns an error if authorization or the request fails.
    #[tracing::instrument(skip(self))]
    pub async fn list_unread_ids(&self, max_results: u32) -> Result<Vec<String>> {
        let max_results = max_results.to_string();
        let response = self
            .http
            .get(self.messages_url())
            .bearer_auth(self.bearer().await?)
            .query(&[
                ("labelIds", LABEL_INBOX),
                ("labelIds", LABEL_UNREAD),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        let list: ListMessagesResponse = check(response).await?.json().await?;
        debug!(count = list.messages.len(), "Listed unread messages");
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    /// Fetches a message in `raw` format, still URL-safe Base64 encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if authorization or the request fails, or the
    /// response has no `raw` field.
    #[tracing::instrument(skip(self))]
    pub async fn get_raw(&self, id: &str) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/{id}", self.messages_url()))
            .bearer_auth(self.bearer().await?)
            .query(&[("format", "raw")])
            .send()
            .await?;

        let message: RawMessageResponse = check(response).await?.json().await?;
        message.raw.ok_or_else(|| Error::MissingRaw(message.id))
    }

    /// Removes the `UNREAD` label from a message.
    ///
    /// # Errors
    ///
    /// Returns an error if authorization or the request fails.
    #[tracing::instrument(skip(self))]
    pub async fn remove_unread(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/{id}/modify", self.messages_url()))
            .bearer_auth(self.bearer().await?)
            .json(&ModifyMessageRequest::mark_read())
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Turns a non-success response into [`Error::Api`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl MailSession for GmailSession {
    async fn list_unread(
        &self,
        max_results: u32,
    ) -> std::result::Result<Vec<MessageHandle>, CollaboratorError> {
        let ids = self
            .list_unread_ids(max_results)
            .await
            .map_err(|e| CollaboratorError::List(Box::new(e)))?;
        Ok(ids.into_iter().map(MessageHandle::new).collect())
    }

    async fn fetch_raw(
        &self,
        handle: &MessageHandle,
    ) -> std::result::Result<RawMessage, CollaboratorError> {
        let raw = self
            .get_raw(&handle.id)
            .await
            .map_err(|e| CollaboratorError::Fetch {
                id: handle.id.clone(),
                source: Box::new(e),
            })?;
        Ok(RawMessage {
            id: handle.id.clone(),
            raw: raw.into_bytes(),
        })
    }

    async fn clear_unread(
        &self,
        handle: &MessageHandle,
    ) -> std::result::Result<(), CollaboratorError> {
        self.remove_unread(&handle.id)
            .await
            .map_err(|e| CollaboratorError::Acknowledge {
                id: handle.id.clone(),
                source: Box::new(e),
            })
    }
}
