//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::auth::{self, CredentialProvider, InteractiveFlowProvider, GMAIL_MODIFY};
use crate::client::ProductionGmailClient;
use crate::config::Config;
use crate::error::Result;
use crate::poller::{Poller, Stopped, SystemClock};
use crate::results::{MatchRecord, ResultLog};
use crate::scanner::InboxScanner;

#[derive(Parser, Debug)]
#[command(name = "subject-watch")]
#[command(version)]
#[command(
    about = "Watch a Gmail inbox for unread messages with a subject prefix",
    long_about = None
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Path to OAuth2 client secret file (overrides paths.credentials)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Path to token cache file (overrides paths.token_cache)
    #[arg(long, global = true)]
    pub token_cache: Option<PathBuf>,

    /// Path to result log file (overrides paths.results)
    #[arg(long, global = true)]
    pub results: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the inbox until interrupted (default)
    Watch {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Authenticate with Gmail API
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// Print logged matches, oldest first
    History {
        /// Only show the most recent N records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Build the run configuration: file, then environment, then path flags
    pub async fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.config).await?;
        config.apply_env(|key| std::env::var(key).ok())?;
        self.apply_path_overrides(&mut config);
        Ok(config)
    }

    fn apply_path_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.credentials {
            config.paths.credentials = path.clone();
        }
        if let Some(path) = &self.token_cache {
            config.paths.token_cache = path.clone();
        }
        if let Some(path) = &self.results {
            config.paths.results = path.clone();
        }
    }
}

/// Authenticate, then poll until Ctrl-C (or after one cycle with `once`)
pub async fn run_watch(config: &Config, once: bool) -> Result<Stopped> {
    config.validate()?;

    let credential = auth::select_provider(config).await.acquire().await?;
    let hub = auth::connect(&credential, &config.paths.token_cache).await?;

    let scanner = InboxScanner::new(Box::new(ProductionGmailClient::new(hub)));
    let poller = Poller::new(
        scanner,
        ResultLog::new(&config.paths.results),
        SystemClock,
        config.watch.subject_prefix.clone(),
        config.polling_interval(),
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping");
            on_signal.cancel();
        }
    });

    let stopped = poller.run(cancel, once.then_some(1)).await?;
    info!("Poller stopped: {:?}", stopped);
    Ok(stopped)
}

/// Authorize (or re-authorize with `force`) and return the account address
pub async fn run_auth(config: &Config, force: bool) -> Result<String> {
    let token_cache = &config.paths.token_cache;

    let credential = if force {
        if token_cache.exists() {
            tokio::fs::remove_file(token_cache).await?;
            info!("Removed existing token cache");
        }
        InteractiveFlowProvider::new(&config.paths.credentials, token_cache)
            .acquire()
            .await?
    } else {
        auth::select_provider(config).await.acquire().await?
    };

    let hub = auth::connect(&credential, token_cache).await?;

    // Must specify scope to avoid triggering an additional OAuth flow
    let (_, profile) = hub
        .users()
        .get_profile("me")
        .add_scope(GMAIL_MODIFY)
        .doit()
        .await?;

    Ok(profile.email_address.unwrap_or_default())
}

/// Logged records, keeping only the last `limit` when given
pub async fn run_history(config: &Config, limit: Option<usize>) -> Result<Vec<MatchRecord>> {
    let mut records = ResultLog::new(&config.paths.results).load().await?;
    if let Some(limit) = limit {
        let skip = records.len().saturating_sub(limit);
        records.drain(..skip);
    }
    Ok(records)
}
