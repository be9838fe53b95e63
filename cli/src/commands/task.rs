// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Task operations commands
//!
//! Commands: run

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

use crate::backend::Backend;
use crate::output::{self, parse_variable};

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Execute a task
    Run {
        /// Task UID
        #[arg(value_name = "UID")]
        uid: String,

        /// Input text (or @file to read it from a file)
        #[arg(short, long, value_name = "INPUT")]
        input: Option<String>,

        /// Override the task's input type (manual, records, syslog, deprecation_log)
        #[arg(long, value_name = "TYPE")]
        input_type: Option<String>,

        /// Record table for `records` tasks
        #[arg(long)]
        table: Option<String>,

        /// Explicit records as a JSON array (or @file.json)
        #[arg(long, value_name = "JSON")]
        records: Option<String>,

        /// Maximum records or log entries
        #[arg(long)]
        limit: Option<usize>,

        /// Records to skip
        #[arg(long)]
        offset: Option<usize>,

        /// Use this configuration instead of the task's own
        #[arg(long, value_name = "UID")]
        configuration: Option<String>,

        /// Extra template variables
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_variable)]
        variables: Vec<(String, String)>,
    },
}

pub async fn handle_command(command: TaskCommand, backend: &Backend, json: bool) -> Result<()> {
    match command {
        TaskCommand::Run {
            uid,
            input,
            input_type,
            table,
            records,
            limit,
            offset,
            configuration,
            variables,
        } => {
            let mut body = Map::new();
            body.insert("uid".into(), Value::String(uid));
            if let Some(input) = input {
                body.insert("input".into(), Value::String(read_argument(&input)?));
            }
            if let Some(records) = records {
                let parsed: Value = serde_json::from_str(&read_argument(&records)?)
                    .context("--records must be a JSON array")?;
                if !parsed.is_array() {
                    anyhow::bail!("--records must be a JSON array");
                }
                body.insert("records".into(), parsed);
            }
            insert_opt(&mut body, "inputType", input_type.map(Value::String));
            insert_opt(&mut body, "table", table.map(Value::String));
            insert_opt(&mut body, "limit", limit.map(|n| json!(n)));
            insert_opt(&mut body, "offset", offset.map(|n| json!(n)));
            insert_opt(&mut body, "configurationUid", configuration.map(Value::String));
            if !variables.is_empty() {
                let vars: Map<String, Value> = variables
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
                body.insert("variables".into(), Value::Object(vars));
            }

            let (status, response) = backend.post("/tasks/execute", Value::Object(body)).await?;
            output::finish(status, &response, json, print_execution)
        }
    }
}

/// Print an execution result: content first, metadata dimmed.
pub fn print_execution(body: &Value) {
    println!("{}", body["content"].as_str().unwrap_or_default());
    println!();
    println!(
        "{}",
        format!(
            "model: {}  tokens: {} in / {} out  time: {:.3}s",
            body["model"].as_str().unwrap_or("?"),
            body["usage"]["promptTokens"].as_u64().unwrap_or(0),
            body["usage"]["completionTokens"].as_u64().unwrap_or(0),
            body["executionTime"].as_f64().unwrap_or(0.0),
        )
        .dimmed()
    );
}

fn insert_opt(body: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        body.insert(key.to_string(), value);
    }
}

/// `@path` reads the file; anything else is taken literally.
fn read_argument(raw: &str) -> Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => {
            let path = PathBuf::from(path);
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))
        }
        None => Ok(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_argument() {
        assert_eq!(read_argument("plain text").unwrap(), "plain text");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "from file ✓").unwrap();
        let arg = format!("@{}", file.path().display());
        assert_eq!(read_argument(&arg).unwrap(), "from file ✓");

        assert!(read_argument("@/definitely/not/here.txt").is_err());
    }
}
