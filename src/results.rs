//! Persisted log of matched subjects

use chrono::{DateTime, Utc};
use chrono_tz::US::Eastern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, WatchError};

/// Timestamp layout for log records, rendered in US/Eastern
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// One matched subject and when it was logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub subject: String,
    pub timestamp: String,
}

impl MatchRecord {
    /// Record `subject` as logged at `at`
    pub fn stamped(subject: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            timestamp: format_timestamp(at),
        }
    }
}

/// Format an instant as `YYYY-MM-DD HH:MM:SS EST|EDT`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Eastern).format(TIMESTAMP_FORMAT).to_string()
}

/// JSON array file of `MatchRecord`s, rewritten whole on every append
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file content, `None` when the file is missing or blank
    async fn read_content(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WatchError::StorageError(format!(
                "Failed to read {:?}: {}",
                self.path, e
            ))),
        }
    }

    /// Read every record; a missing or blank file is an empty log
    pub async fn load(&self) -> Result<Vec<MatchRecord>> {
        let Some(content) = self.read_content().await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&content).map_err(|e| {
            WatchError::StorageError(format!(
                "{:?} is not a JSON array of records: {}",
                self.path, e
            ))
        })
    }

    /// Existing entries as untyped JSON, so appends keep them whatever their shape
    async fn load_entries(&self) -> Result<Vec<serde_json::Value>> {
        let Some(content) = self.read_content().await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&content).map_err(|e| {
            WatchError::StorageError(format!("{:?} is not a JSON array: {}", self.path, e))
        })
    }

    /// Append `records` after the existing entries and rewrite the file
    ///
    /// Existing entries are written back with all their fields. Missing
    /// parent directories are created. An empty slice leaves the file
    /// untouched, including not creating it.
    pub async fn append(&self, records: &[MatchRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut all = self.load_entries().await?;
        for record in records {
            all.push(serde_json::to_value(record)?);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    WatchError::StorageError(format!("Failed to create {:?}: {}", parent, e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&all)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            WatchError::StorageError(format!("Failed to write {:?}: {}", self.path, e))
        })?;

        tracing::debug!(
            "Appended {} record(s) to {:?} ({} total)",
            records.len(),
            self.path,
            all.len()
        );
        Ok(())
    }
}
