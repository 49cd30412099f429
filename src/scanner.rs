//! Inbox scanner: finds unread messages whose subject starts with a prefix

use std::collections::HashSet;
use tracing::{debug, info};

use crate::client::{GmailClient, UNREAD_LABEL};
use crate::error::Result;

/// Build the provider-side search query for a subject prefix
///
/// Gmail's `subject:` operator is a substring match, so this only narrows the
/// candidates. Double quotes cannot be escaped inside a quoted Gmail term and
/// are dropped from the query.
pub fn build_query(prefix: &str) -> String {
    format!("subject:\"{}\" is:unread", prefix.replace('"', ""))
}

/// Outcome of one scan pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Unique matching subjects in first-seen order
    pub subjects: Vec<String>,
    /// Message ids returned by the search
    pub candidates: usize,
    /// Messages whose UNREAD label was removed
    pub marked_read: usize,
}

pub struct InboxScanner {
    client: Box<dyn GmailClient>,
}

impl InboxScanner {
    pub fn new(client: Box<dyn GmailClient>) -> Self {
        Self { client }
    }

    /// Run one pass for `prefix`
    ///
    /// Every message whose subject starts with `prefix` is marked read, even
    /// when its subject duplicates an earlier match. Errors from any API call
    /// end the pass immediately.
    pub async fn scan(&self, prefix: &str) -> Result<ScanOutcome> {
        let query = build_query(prefix);
        debug!("Search criteria: {}", query);

        let ids = self.client.list_message_ids(&query).await?;
        let mut outcome = ScanOutcome {
            candidates: ids.len(),
            ..Default::default()
        };

        if ids.is_empty() {
            info!("No new messages found.");
            return Ok(outcome);
        }

        let mut seen = HashSet::new();

        for id in &ids {
            let Some(subject) = self.client.get_subject(id).await? else {
                debug!("Message {} has no subject header", id);
                continue;
            };

            if !subject.starts_with(prefix) {
                debug!("Skipping {}: {:?} does not start with the prefix", id, subject);
                continue;
            }

            self.client.remove_label(id, UNREAD_LABEL).await?;
            outcome.marked_read += 1;

            if seen.insert(subject.clone()) {
                outcome.subjects.push(subject);
            }
        }

        if outcome.subjects.is_empty() {
            info!("No new messages found with subject starting with \"{}\".", prefix);
        } else {
            info!(
                "Found {} new messages with subject starting with \"{}\":",
                outcome.subjects.len(),
                prefix
            );
            for subject in &outcome.subjects {
                info!("{}", subject);
            }
        }

        Ok(outcome)
    }
}
