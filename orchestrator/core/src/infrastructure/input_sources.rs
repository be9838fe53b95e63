// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Input Sources
//!
//! Reference implementations of the task input collaborators.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Supply record rows and log entries to input resolution
//!
//! - [`InMemoryRecordSource`] serves named tables loaded from the manifest.
//! - [`FileLogSource`] streams JSON-lines log files, keeping only the newest
//!   matching entries; lines that are not JSON become plain `INFO` entries.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::domain::input::{
    InputError, LogEntry, LogKind, LogSource, LogSourceDescriptor, RecordQuery, RecordSource,
};

/// Entries returned when neither the descriptor nor the source sets a limit
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Named tables of JSON rows held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSource {
    tables: HashMap<String, Vec<serde_json::Value>>,
}

impl InMemoryRecordSource {
    pub fn new(tables: HashMap<String, Vec<serde_json::Value>>) -> Self {
        Self { tables }
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn fetch(&self, query: &RecordQuery) -> Result<Vec<serde_json::Value>, InputError> {
        let rows = self
            .tables
            .get(&query.table)
            .ok_or_else(|| InputError::UnknownTable(query.table.clone()))?;

        Ok(rows
            .iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}

/// JSON-lines log reader with per-kind default paths
#[derive(Debug, Clone, Default)]
pub struct FileLogSource {
    syslog_path: Option<PathBuf>,
    deprecation_log_path: Option<PathBuf>,
}

impl FileLogSource {
    pub fn new(syslog_path: Option<PathBuf>, deprecation_log_path: Option<PathBuf>) -> Self {
        Self {
            syslog_path,
            deprecation_log_path,
        }
    }

    fn default_path(&self, kind: LogKind) -> Option<&PathBuf> {
        match kind {
            LogKind::Syslog => self.syslog_path.as_ref(),
            LogKind::DeprecationLog => self.deprecation_log_path.as_ref(),
        }
    }
}

fn parse_line(line: &str) -> LogEntry {
    serde_json::from_str::<LogEntry>(line).unwrap_or_else(|_| LogEntry {
        timestamp: None,
        level: "INFO".to_string(),
        message: line.to_string(),
    })
}

#[async_trait]
impl LogSource for FileLogSource {
    async fn read(
        &self,
        kind: LogKind,
        descriptor: &LogSourceDescriptor,
    ) -> Result<Vec<LogEntry>, InputError> {
        let path = descriptor
            .path
            .as_ref()
            .or_else(|| self.default_path(kind))
            .ok_or_else(|| {
                InputError::InvalidDescriptor(format!("No log file configured for {}", kind))
            })?;

        let unavailable = |e: std::io::Error| {
            InputError::Unavailable(format!("cannot read {} ({})", path.display(), e.kind()))
        };
        let file = tokio::fs::File::open(path).await.map_err(unavailable)?;

        let level = descriptor.level.as_deref().map(str::trim);
        let limit = descriptor.limit.unwrap_or(DEFAULT_LOG_LIMIT);

        // only the newest `limit` matching entries are ever held
        let mut tail: VecDeque<LogEntry> = VecDeque::with_capacity(limit.min(DEFAULT_LOG_LIMIT));
        let mut lines = BufReader::new(file).lines();
        while let Some(line) = lines.next_line().await.map_err(unavailable)? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry = parse_line(line);
            if !level.is_none_or(|lvl| entry.level.eq_ignore_ascii_case(lvl)) {
                continue;
            }
            tail.push_back(entry);
            if tail.len() > limit {
                tail.pop_front();
            }
        }
        let entries: Vec<LogEntry> = tail.into();

        debug!(%kind, path = %path.display(), count = entries.len(), "Read log entries");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn source() -> InMemoryRecordSource {
        let rows = (1..=5).map(|i| json!({ "id": i })).collect();
        let mut tables = HashMap::new();
        tables.insert("incidents".to_string(), rows);
        InMemoryRecordSource::new(tables)
    }

    #[tokio::test]
    async fn test_record_paging() {
        let query = RecordQuery {
            table: "incidents".to_string(),
            limit: 2,
            offset: 3,
        };
        let rows = source().fetch(&query).await.unwrap();
        assert_eq!(rows, vec![json!({"id": 4}), json!({"id": 5})]);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let query = RecordQuery {
            table: "nope".to_string(),
            limit: 10,
            offset: 0,
        };
        let err = source().fetch(&query).await.unwrap_err();
        assert!(matches!(err, InputError::UnknownTable(t) if t == "nope"));
    }

    #[tokio::test]
    async fn test_log_file_filter_and_tail() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"timestamp":"2026-01-01T00:00:00Z","level":"info","message":"boot"}}"#).unwrap();
        writeln!(file, r#"{{"timestamp":"2026-01-01T00:00:01Z","level":"error","message":"disk failure"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "plain text line").unwrap();
        writeln!(file, r#"{{"level":"ERROR","msg":"fan stopped"}}"#).unwrap();

        let logs = FileLogSource::new(Some(file.path().to_path_buf()), None);

        let all = logs
            .read(LogKind::Syslog, &LogSourceDescriptor::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[2].render(), "INFO plain text line");

        let errors = logs
            .read(
                LogKind::Syslog,
                &LogSourceDescriptor {
                    level: Some("Error".to_string()),
                    limit: Some(1),
                    path: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "fan stopped");
    }

    #[tokio::test]
    async fn test_large_log_keeps_newest_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..20_000 {
            let level = if i % 2 == 0 { "info" } else { "warn" };
            writeln!(file, r#"{{"level":"{}","message":"line {}"}}"#, level, i).unwrap();
        }
        let logs = FileLogSource::new(Some(file.path().to_path_buf()), None);

        let descriptor = LogSourceDescriptor {
            level: Some("WARN".to_string()),
            limit: Some(3),
            path: None,
        };
        let entries = logs.read(LogKind::Syslog, &descriptor).await.unwrap();
        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["line 19995", "line 19997", "line 19999"]);

        let none = LogSourceDescriptor {
            limit: Some(0),
            ..Default::default()
        };
        assert!(logs.read(LogKind::Syslog, &none).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_log_configuration() {
        let logs = FileLogSource::default();
        let err = logs
            .read(LogKind::DeprecationLog, &LogSourceDescriptor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidDescriptor(_)));

        let descriptor = LogSourceDescriptor {
            path: Some(PathBuf::from("/definitely/not/here.log")),
            ..Default::default()
        };
        let err = logs.read(LogKind::Syslog, &descriptor).await.unwrap_err();
        assert!(matches!(err, InputError::Unavailable(_)));
    }
}
