// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Task input sources
//!
//! Non-manual task inputs come from collaborators the engine does not
//! implement itself: a paged record store and a structured log reader. Each
//! yields data or a descriptive [`InputError`]; neither may silently return
//! nothing on failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One page request against a named table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub table: String,
    pub limit: usize,
    pub offset: usize,
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, query: &RecordQuery) -> Result<Vec<serde_json::Value>, InputError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Syslog,
    DeprecationLog,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Syslog => f.write_str("syslog"),
            LogKind::DeprecationLog => f.write_str("deprecation log"),
        }
    }
}

/// Parsed form of a task's `input_source` for log inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSourceDescriptor {
    /// Log file; the source's configured default when absent
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Most recent N entries
    #[serde(default)]
    pub limit: Option<usize>,

    /// Only entries of this level (case-insensitive)
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, alias = "time", alias = "ts")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default = "default_level")]
    pub level: String,

    #[serde(alias = "msg")]
    pub message: String,
}

fn default_level() -> String {
    "INFO".to_string()
}

impl LogEntry {
    pub fn render(&self) -> String {
        match &self.timestamp {
            Some(ts) => format!("[{}] {} {}", ts.to_rfc3339(), self.level.to_uppercase(), self.message),
            None => format!("{} {}", self.level.to_uppercase(), self.message),
        }
    }
}

#[async_trait]
pub trait LogSource: Send + Sync {
    async fn read(
        &self,
        kind: LogKind,
        descriptor: &LogSourceDescriptor,
    ) -> Result<Vec<LogEntry>, InputError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum InputError {
    #[error("No table specified")]
    MissingTable,

    #[error("Table '{0}' does not exist")]
    UnknownTable(String),

    #[error("Invalid input source: {0}")]
    InvalidDescriptor(String),

    #[error("Input source unavailable: {0}")]
    Unavailable(String),
}
