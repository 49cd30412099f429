//! Gmail API client

use async_trait::async_trait;
use google_gmail1::api::{Message, ModifyMessageRequest};
use tracing::debug;

use crate::auth::{GmailHub, GMAIL_MODIFY};
use crate::error::Result;

/// Gmail's system label for unread messages
pub const UNREAD_LABEL: &str = "UNREAD";

/// Page size for `users.messages.list`
const LIST_PAGE_SIZE: u32 = 100;

/// Trait defining the Gmail operations the watcher needs, for easier testing
#[async_trait]
pub trait GmailClient: Send + Sync {
    /// List all message IDs matching a query, following every result page
    async fn list_message_ids(&self, query: &str) -> Result<Vec<String>>;

    /// Fetch only the Subject header of a message; `None` if it has none
    async fn get_subject(&self, id: &str) -> Result<Option<String>>;

    /// Remove a label from a message
    async fn remove_label(&self, message_id: &str, label_id: &str) -> Result<()>;
}

/// Gmail client backed by the google-gmail1 hub
///
/// Calls are issued one at a time and are not retried; failures propagate.
pub struct ProductionGmailClient {
    hub: GmailHub,
}

impl ProductionGmailClient {
    pub fn new(hub: GmailHub) -> Self {
        Self { hub }
    }
}

/// Extract the Subject header from a metadata-format message
fn subject_header(msg: &Message) -> Option<String> {
    msg.payload
        .as_ref()
        .and_then(|p| p.headers.as_ref())?
        .iter()
        .find(|h| h.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case("subject")))
        .and_then(|h| h.value.clone())
}

#[async_trait]
impl GmailClient for ProductionGmailClient {
    async fn list_message_ids(&self, query: &str) -> Result<Vec<String>> {
        let mut all_ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut call = self
                .hub
                .users()
                .messages_list("me")
                .q(query)
                .max_results(LIST_PAGE_SIZE);

            if let Some(token) = page_token.as_ref() {
                call = call.page_token(token);
            }

            let (_, response) = call.add_scope(GMAIL_MODIFY).doit().await?;

            if let Some(messages) = response.messages {
                for msg_ref in messages {
                    if let Some(id) = msg_ref.id {
                        all_ids.push(id);
                    }
                }
            }

            page_token = response.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!("Query {:?} returned {} message(s)", query, all_ids.len());
        Ok(all_ids)
    }

    async fn get_subject(&self, id: &str) -> Result<Option<String>> {
        let (_, msg) = self
            .hub
            .users()
            .messages_get("me", id)
            .format("metadata")
            .add_metadata_headers("Subject")
            .add_scope(GMAIL_MODIFY)
            .doit()
            .await?;

        Ok(subject_header(&msg))
    }

    async fn remove_label(&self, message_id: &str, label_id: &str) -> Result<()> {
        let modify_request = ModifyMessageRequest {
            add_label_ids: None,
            remove_label_ids: Some(vec![label_id.to_string()]),
        };

        self.hub
            .users()
            .messages_modify(modify_request, "me", message_id)
            .add_scope(GMAIL_MODIFY)
            .doit()
            .await?;

        debug!("Removed label {} from message {}", label_id, message_id);
        Ok(())
    }
}
