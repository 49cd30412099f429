//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subject_watch::auth::{ClientIdentity, Credential, CredentialProvider, REQUIRED_SCOPES};
use subject_watch::client::GmailClient;
use subject_watch::error::Result;
use subject_watch::poller::Clock;

/// Calls observed by a `FakeInbox`
#[derive(Debug, Default)]
pub struct InboxCalls {
    pub queries: Vec<String>,
    pub fetched: Vec<String>,
    pub marked_read: Vec<(String, String)>,
}

/// In-memory mailbox: id -> subject, with an unread flag per message
///
/// `list_message_ids` mimics Gmail's `subject:"..." is:unread` search as a
/// case-insensitive substring match over unread messages.
#[derive(Clone, Default)]
pub struct FakeInbox {
    messages: Arc<Mutex<Vec<(String, Option<String>, bool)>>>,
    pub calls: Arc<Mutex<InboxCalls>>,
}

impl FakeInbox {
    pub fn with_subjects(subjects: &[&str]) -> Self {
        let inbox = Self::default();
        for (i, subject) in subjects.iter().enumerate() {
            inbox.deliver(&format!("msg-{}", i + 1), Some(subject));
        }
        inbox
    }

    pub fn deliver(&self, id: &str, subject: Option<&str>) {
        self.messages
            .lock()
            .unwrap()
            .push((id.to_string(), subject.map(str::to_string), true));
    }

    pub fn unread_ids(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, unread)| *unread)
            .map(|(id, _, _)| id.clone())
            .collect()
    }
}

fn quoted_term(query: &str) -> String {
    query
        .split('"')
        .nth(1)
        .unwrap_or_default()
        .to_lowercase()
}

#[async_trait]
impl GmailClient for FakeInbox {
    async fn list_message_ids(&self, query: &str) -> Result<Vec<String>> {
        self.calls.lock().unwrap().queries.push(query.to_string());
        let term = quoted_term(query);

        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, subject, unread)| {
                *unread
                    && subject
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&term))
            })
            .map(|(id, _, _)| id.clone())
            .collect())
    }

    async fn get_subject(&self, id: &str) -> Result<Option<String>> {
        self.calls.lock().unwrap().fetched.push(id.to_string());
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|(msg_id, _, _)| msg_id == id)
            .and_then(|(_, subject, _)| subject.clone()))
    }

    async fn remove_label(&self, message_id: &str, label_id: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .marked_read
            .push((message_id.to_string(), label_id.to_string()));

        if label_id == "UNREAD" {
            for (id, _, unread) in self.messages.lock().unwrap().iter_mut() {
                if id == message_id {
                    *unread = false;
                }
            }
        }
        Ok(())
    }
}

/// Clock pinned to one instant that records sleeps instead of waiting
#[derive(Clone)]
pub struct FixedClock {
    pub at: DateTime<Utc>,
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Self {
            at: Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap(),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Provider that hands out a fixed credential without touching the network
pub struct FakeProvider {
    pub credential: Credential,
    pub calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl CredentialProvider for FakeProvider {
    async fn acquire(&self) -> Result<Credential> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.credential.clone())
    }
}

pub fn test_credential() -> Credential {
    Credential {
        access_token: "ya29.test-access".to_string(),
        refresh_token: Some("1//test-refresh".to_string()),
        expiry: Some(Utc::now() + chrono::Duration::hours(1)),
        scopes: REQUIRED_SCOPES.iter().map(|s| s.to_string()).collect(),
        client: ClientIdentity {
            client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            client_secret: "test-secret".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        },
    }
}

/// Environment lookup backed by a map
pub fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}
