// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Model commands
//!
//! Commands: toggle, default, limits

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use crate::backend::Backend;
use crate::commands::provider::print_toggle;
use crate::output;

#[derive(Subcommand)]
pub enum ModelCommand {
    /// Activate or deactivate a model
    Toggle {
        /// Model UID
        #[arg(value_name = "UID")]
        uid: String,
    },

    /// Make a model the default
    Default {
        /// Model UID
        #[arg(value_name = "UID")]
        uid: String,
    },

    /// Ask the provider for a model's context and output limits
    Limits {
        /// Model UID
        #[arg(value_name = "UID")]
        uid: String,

        /// Store the detected limits on the model
        #[arg(long)]
        persist: bool,
    },
}

pub async fn handle_command(command: ModelCommand, backend: &Backend, json: bool) -> Result<()> {
    match command {
        ModelCommand::Toggle { uid } => {
            let (status, body) = backend.post("/models/toggle", json!({ "uid": uid })).await?;
            output::finish(status, &body, json, |body| print_toggle("Model", &uid, body))
        }
        ModelCommand::Default { uid } => {
            let (status, body) = backend.post("/models/default", json!({ "uid": uid })).await?;
            output::finish(status, &body, json, |_| {
                output::success(&format!("Model {} is now the default", uid))
            })
        }
        ModelCommand::Limits { uid, persist } => {
            let (status, body) = backend
                .post("/models/limits", json!({ "modelUid": uid, "persist": persist }))
                .await?;
            output::finish(status, &body, json, |body| {
                println!("{}", "Model limits:".bold());
                output::field("Context length", &body["limits"]["contextLength"]);
                output::field("Max output tokens", &body["limits"]["maxOutputTokens"]);
                if persist {
                    output::success("Limits saved");
                }
            })
        }
    }
}
