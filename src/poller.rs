//! Fixed-interval poll loop driving the scanner and the result log

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::results::{MatchRecord, ResultLog};
use crate::scanner::InboxScanner;

/// Source of wall-clock time and delays
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Real time backed by tokio's timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How a `run` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    Cancelled { cycles: usize },
    CycleLimit { cycles: usize },
}

pub struct Poller<C: Clock> {
    scanner: InboxScanner,
    log: ResultLog,
    clock: C,
    prefix: String,
    interval: Duration,
}

impl<C: Clock> Poller<C> {
    pub fn new(
        scanner: InboxScanner,
        log: ResultLog,
        clock: C,
        prefix: String,
        interval: Duration,
    ) -> Self {
        Self {
            scanner,
            log,
            clock,
            prefix,
            interval,
        }
    }

    /// One scan-then-log cycle; returns the number of records written
    pub async fn cycle(&self) -> Result<usize> {
        info!("Checking for emails with subject '{}'...", self.prefix);

        let outcome = self.scanner.scan(&self.prefix).await?;
        debug!("{} candidate(s), {} marked read", outcome.candidates, outcome.marked_read);
        if outcome.subjects.is_empty() {
            return Ok(0);
        }

        let now = self.clock.now();
        let records: Vec<MatchRecord> = outcome
            .subjects
            .into_iter()
            .map(|subject| MatchRecord::stamped(subject, now))
            .collect();

        self.log.append(&records).await?;
        Ok(records.len())
    }

    /// Run cycles until `cancel` fires or `max_cycles` have completed
    ///
    /// Sleeps `interval` after every cycle except the last one of a limited
    /// run. A failing cycle ends the loop with its error.
    pub async fn run(
        &self,
        cancel: CancellationToken,
        max_cycles: Option<usize>,
    ) -> Result<Stopped> {
        info!(
            "Polling every {}s for subjects starting with '{}'",
            self.interval.as_secs(),
            self.prefix
        );
        info!("Logging matches to {:?}", self.log.path());

        let mut cycles = 0;
        loop {
            if cancel.is_cancelled() {
                return Ok(Stopped::Cancelled { cycles });
            }

            if let Err(e) = self.cycle().await {
                if e.is_api_failure() {
                    error!("Gmail API request failed after {} cycles: {}", cycles, e);
                } else {
                    error!("Poll cycle failed after {} cycles: {}", cycles, e);
                }
                return Err(e);
            }
            cycles += 1;

            if max_cycles.is_some_and(|max| cycles >= max) {
                return Ok(Stopped::CycleLimit { cycles });
            }

            tokio::select! {
                _ = cancel.cancelled() => return Ok(Stopped::Cancelled { cycles }),
                _ = self.clock.sleep(self.interval) => {}
            }
        }
    }
}
