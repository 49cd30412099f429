//! Gmail subject watcher
//!
//! Polls a Gmail inbox for unread messages whose subject starts with a
//! configured prefix, marks them read, and appends one `{subject, timestamp}`
//! record per unique subject to a JSON log.
//!
//! # Example Usage
//!
//! ```no_run
//! use subject_watch::{auth, auth::CredentialProvider, client::ProductionGmailClient};
//! use subject_watch::{config::Config, poller::{Poller, SystemClock}};
//! use subject_watch::{results::ResultLog, scanner::InboxScanner};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load("config.toml".as_ref()).await?;
//!     config.apply_env(|key| std::env::var(key).ok())?;
//!     config.validate()?;
//!
//!     let credential = auth::select_provider(&config).await.acquire().await?;
//!     let hub = auth::connect(&credential, &config.paths.token_cache).await?;
//!
//!     let poller = Poller::new(
//!         InboxScanner::new(Box::new(ProductionGmailClient::new(hub))),
//!         ResultLog::new(&config.paths.results),
//!         SystemClock,
//!         config.watch.subject_prefix.clone(),
//!         config.polling_interval(),
//!     );
//!     poller.run(CancellationToken::new(), None).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 credential providers, token cache and Gmail hub
//! - [`client`] - Gmail API client trait and production implementation
//! - [`cli`] - Command-line interface and command runners
//! - [`config`] - Configuration file and environment overrides
//! - [`error`] - Error types and result aliases
//! - [`poller`] - Fixed-interval poll loop with injectable clock
//! - [`results`] - JSON result log and Eastern-time timestamps
//! - [`scanner`] - Subject-prefix inbox scan

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod results;
pub mod scanner;

pub use error::{Result, WatchError};

pub use auth::{CachedTokenProvider, Credential, CredentialProvider, InteractiveFlowProvider};
pub use client::{GmailClient, ProductionGmailClient};
pub use config::Config;
pub use poller::{Clock, Poller, Stopped, SystemClock};
pub use results::{MatchRecord, ResultLog};
pub use scanner::{InboxScanner, ScanOutcome};
