// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Input Resolution
//!
//! Produces the prompt variables for one task execution from the task's
//! input type and the caller's request parameters.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Bind `{{input}}` (and friends) before prompt rendering
//!
//! | Input type | `input` | Also binds |
//! |------------|---------|------------|
//! | `manual` | caller text, or empty | |
//! | `records` | pretty JSON array of rows | `table`, `count` |
//! | `syslog`, `deprecation_log` | one `[ts] LEVEL message` line per entry | `count` |
//!
//! Caller-supplied `variables` are merged underneath; resolved values always
//! win.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::input::{InputError, LogKind, LogSource, LogSourceDescriptor, RecordQuery, RecordSource};
use crate::domain::task::InputType;
use crate::infrastructure::prompt_template_engine::PromptVariables;

pub const DEFAULT_RECORD_LIMIT: usize = 50;
pub const MAX_RECORD_LIMIT: usize = 1000;

/// Caller-side input parameters of an execution request.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    /// Free text for `manual` tasks
    pub input: Option<String>,

    /// Overrides the task's own input type
    pub input_type: Option<InputType>,

    pub table: Option<String>,

    /// Pre-selected rows; skips the record fetch
    pub records: Option<Vec<Value>>,

    pub limit: Option<usize>,

    pub offset: Option<usize>,

    pub variables: HashMap<String, String>,
}

pub struct InputResolver {
    records: Arc<dyn RecordSource>,
    logs: Arc<dyn LogSource>,
    default_limit: usize,
    max_limit: usize,
}

fn source_str<'a>(source: &'a Value, key: &str) -> Option<&'a str> {
    source
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn source_usize(source: &Value, key: &str) -> Option<usize> {
    source
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|n| usize::try_from(n).ok())
}

impl InputResolver {
    pub fn new(records: Arc<dyn RecordSource>, logs: Arc<dyn LogSource>) -> Self {
        Self {
            records,
            logs,
            default_limit: DEFAULT_RECORD_LIMIT,
            max_limit: MAX_RECORD_LIMIT,
        }
    }

    pub fn with_record_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    /// Resolve the variables for a task whose stored input type is
    /// `task_input_type` and whose source descriptor is `input_source`.
    pub async fn resolve(
        &self,
        task_input_type: InputType,
        input_source: &Value,
        request: &TaskInput,
    ) -> Result<PromptVariables, InputError> {
        let input_type = request.input_type.unwrap_or(task_input_type);
        let mut resolved = PromptVariables::new();

        match input_type {
            InputType::Manual => {
                resolved.insert("input".to_string(), request.input.clone().unwrap_or_default());
            }
            InputType::Records => {
                let table = request
                    .table
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .or_else(|| source_str(input_source, "table"));

                let rows = match &request.records {
                    Some(rows) => rows.clone(),
                    None => {
                        let table = table.ok_or(InputError::MissingTable)?;
                        let query = RecordQuery {
                            table: table.to_string(),
                            limit: self.record_limit(request.limit.or_else(|| source_usize(input_source, "limit"))),
                            offset: request
                                .offset
                                .or_else(|| source_usize(input_source, "offset"))
                                .unwrap_or(0),
                        };
                        self.records.fetch(&query).await?
                    }
                };

                let rendered = serde_json::to_string_pretty(&rows)
                    .map_err(|e| InputError::InvalidDescriptor(e.to_string()))?;

                debug!(table = table.unwrap_or(""), count = rows.len(), "Resolved record input");
                resolved.insert("input".to_string(), rendered);
                resolved.insert("table".to_string(), table.unwrap_or_default().to_string());
                resolved.insert("count".to_string(), rows.len().to_string());
            }
            InputType::Syslog | InputType::DeprecationLog => {
                let kind = if input_type == InputType::Syslog {
                    LogKind::Syslog
                } else {
                    LogKind::DeprecationLog
                };

                let mut descriptor: LogSourceDescriptor = if input_source.is_null() {
                    LogSourceDescriptor::default()
                } else {
                    serde_json::from_value(input_source.clone())
                        .map_err(|e| InputError::InvalidDescriptor(e.to_string()))?
                };
                if request.limit.is_some() {
                    descriptor.limit = request.limit;
                }

                let entries = self.logs.read(kind, &descriptor).await?;
                let rendered = entries
                    .iter()
                    .map(|entry| entry.render())
                    .collect::<Vec<_>>()
                    .join("\n");

                debug!(%kind, count = entries.len(), "Resolved log input");
                resolved.insert("input".to_string(), rendered);
                resolved.insert("count".to_string(), entries.len().to_string());
            }
        }

        let mut variables = request.variables.clone();
        variables.extend(resolved);
        Ok(variables)
    }

    fn record_limit(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|&limit| limit > 0)
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
    }
}
