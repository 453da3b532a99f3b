//! Inbox processing.
//!
//! One poll lists unread messages and runs each through
//! fetch, decode, extract, record and acknowledge, in order. A message is
//! acknowledged only when it was recorded or carried no identifier, so a
//! message that failed to decode or persist stays unread and is retried by
//! the next poll.
//!
//! Recording and acknowledging are separate systems with no shared
//! transaction. If the record commits and the acknowledge fails, the next
//! poll records the message again: delivery is at least once.

use tracing::{Instrument, error, info, info_span, warn};

use crate::decode::decode;
use crate::error::CollaboratorError;
use crate::extract::extract;
use crate::mail::{MailSession, MessageHandle};
use crate::scan::{ScanRecord, ScanRecorder};

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An identifier was found and a scan recorded.
    Recorded(ScanRecord),
    /// The message carried no identifier.
    NoIdentifier,
    /// The message could not be fetched.
    FetchFailed,
    /// The message's transport encoding was malformed.
    DecodeFailed,
    /// An identifier was found but the scan could not be stored.
    PersistFailed,
}

impl Outcome {
    /// Whether the message is done with and may be marked read.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Recorded(_) | Self::NoIdentifier)
    }
}

/// Result of processing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReport {
    /// Provider message identifier.
    pub id: String,
    /// What happened.
    pub outcome: Outcome,
    /// Whether the unread marker was cleared.
    pub acknowledged: bool,
}

/// Result of processing a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Per-message results, in processing order.
    pub messages: Vec<MessageReport>,
    /// Number of scans recorded.
    pub new_records: usize,
}

impl BatchReport {
    fn push(&mut self, report: MessageReport) {
        if matches!(report.outcome, Outcome::Recorded(_)) {
            self.new_records += 1;
        }
        self.messages.push(report);
    }

    /// Scans recorded in this batch.
    pub fn records(&self) -> impl Iterator<Item = &ScanRecord> {
        self.messages.iter().filter_map(|m| match &m.outcome {
            Outcome::Recorded(record) => Some(record),
            _ => None,
        })
    }

    /// Number of messages left unread for the next poll.
    #[must_use]
    pub fn unacknowledged(&self) -> usize {
        self.messages.iter().filter(|m| !m.acknowledged).count()
    }
}

/// Drives messages from a mail session into a scan recorder.
pub struct InboxProcessor<'a, M: ?Sized, R: ?Sized> {
    session: &'a M,
    recorder: &'a R,
}

impl<'a, M, R> InboxProcessor<'a, M, R>
where
    M: MailSession + ?Sized,
    R: ScanRecorder + ?Sized,
{
    /// Creates a processor over an authenticated session and a recorder.
    #[must_use]
    pub const fn new(session: &'a M, recorder: &'a R) -> Self {
        Self { session, recorder }
    }

    /// Lists up to `max_results` unread messages and processes them.
    ///
    /// # Errors
    ///
    /// Returns an error only if listing fails. Per-message failures are
    /// reported in the [`BatchReport`].
    #[tracing::instrument(skip(self))]
    pub async fn poll(&self, max_results: u32) -> Result<BatchReport, CollaboratorError> {
        let messages = self.session.list_unread(max_results).await?;

        if messages.is_empty() {
            info!("No messages found.");
            return Ok(BatchReport::default());
        }

        info!("Found {} messages.", messages.len());
        Ok(self.run_batch(&messages).await)
    }

    /// Processes `messages` in order and returns the number of scans recorded.
    pub async fn process_batch(&self, messages: &[MessageHandle]) -> usize {
        self.run_batch(messages).await.new_records
    }

    /// Processes `messages` in order and reports on each.
    pub async fn run_batch(&self, messages: &[MessageHandle]) -> BatchReport {
        let mut report = BatchReport::default();
        for handle in messages {
            let span = info_span!("message", id = %handle.id);
            report.push(self.process_message(handle).instrument(span).await);
        }
        report
    }

    /// Processes one message.
    pub async fn process_message(&self, handle: &MessageHandle) -> MessageReport {
        let outcome = self.settle(handle).await;

        let acknowledged = outcome.is_settled() && self.acknowledge(handle).await;

        MessageReport {
            id: handle.id.clone(),
            outcome,
            acknowledged,
        }
    }

    async fn settle(&self, handle: &MessageHandle) -> Outcome {
        let raw = match self.session.fetch_raw(handle).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Skipping message that could not be fetched");
                return Outcome::FetchFailed;
            }
        };

        let decoded = match decode(&raw.raw) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(error = %e, "Skipping message that could not be decoded");
                return Outcome::DecodeFailed;
            }
        };

        let Some(equipment_id) = extract(&decoded.combined_text()) else {
            info!("No equipment identifier found in this message.");
            return Outcome::NoIdentifier;
        };

        match self.recorder.record(&equipment_id).await {
            Ok(record) => {
                info!(
                    "Inserted entry_log for equipment_id: {} (id: {})",
                    record.equipment_id, record.id
                );
                Outcome::Recorded(record)
            }
            Err(e) => {
                error!(error = %e, %equipment_id, "Scan not recorded, leaving message unread");
                Outcome::PersistFailed
            }
        }
    }

    async fn acknowledge(&self, handle: &MessageHandle) -> bool {
        match self.session.clear_unread(handle).await {
            Ok(()) => {
                info!("Marked message {} as read", handle.id);
                true
            }
            Err(e) => {
                warn!("Failed to mark message {} as read: {e}", handle.id);
                false
            }
        }
    }
}
