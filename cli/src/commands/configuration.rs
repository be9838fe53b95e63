// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Generation configuration commands
//!
//! Commands: test, default

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use crate::backend::Backend;
use crate::commands::task::print_execution;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigurationCommand {
    /// Send a test prompt through a configuration
    Test {
        /// Configuration UID
        #[arg(value_name = "UID")]
        uid: String,

        /// Prompt to send (default: a short greeting)
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Make a configuration the default
    Default {
        /// Configuration UID
        #[arg(value_name = "UID")]
        uid: String,
    },
}

pub async fn handle_command(command: ConfigurationCommand, backend: &Backend, json: bool) -> Result<()> {
    match command {
        ConfigurationCommand::Test { uid, prompt } => {
            let (status, body) = backend
                .post("/configurations/test", json!({ "uid": uid, "prompt": prompt }))
                .await?;
            output::finish(status, &body, json, print_execution)
        }
        ConfigurationCommand::Default { uid } => {
            let (status, body) = backend
                .post("/configurations/default", json!({ "uid": uid }))
                .await?;
            output::finish(status, &body, json, |_| {
                output::success(&format!("Configuration {} is now the default", uid))
            })
        }
    }
}
