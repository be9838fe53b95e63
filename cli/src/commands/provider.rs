// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Provider diagnostics commands
//!
//! Commands: test, models, toggle, primary

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::output;

#[derive(Subcommand)]
pub enum ProviderCommand {
    /// Test the connection to a provider
    Test {
        /// Provider UID
        #[arg(value_name = "UID")]
        uid: String,
    },

    /// List the models a provider offers
    Models {
        /// Provider UID
        #[arg(value_name = "UID")]
        uid: String,

        /// Create (inactive) catalog entries for models not yet known
        #[arg(long)]
        import: bool,
    },

    /// Activate or deactivate a provider
    Toggle {
        /// Provider UID
        #[arg(value_name = "UID")]
        uid: String,
    },

    /// Show the highest-priority active provider
    Primary,
}

pub async fn handle_command(command: ProviderCommand, backend: &Backend, json: bool) -> Result<()> {
    match command {
        ProviderCommand::Test { uid } => {
            let (status, body) = backend.post("/providers/test", json!({ "providerUid": uid })).await?;
            output::finish(status, &body, json, |body| {
                output::success(body["message"].as_str().unwrap_or("Connection successful"));
                print_models(&body["models"]);
            })
        }
        ProviderCommand::Models { uid, import } => {
            let (status, body) = backend
                .post("/providers/models", json!({ "providerUid": uid, "import": import }))
                .await?;
            output::finish(status, &body, json, |body| {
                print_models(&body["models"]);
                if import {
                    output::success(&format!(
                        "Imported {} model(s)",
                        body["imported"].as_u64().unwrap_or(0)
                    ));
                }
            })
        }
        ProviderCommand::Toggle { uid } => {
            let (status, body) = backend.post("/providers/toggle", json!({ "uid": uid })).await?;
            output::finish(status, &body, json, |body| print_toggle("Provider", &uid, body))
        }
        ProviderCommand::Primary => {
            let (status, body) = backend.get("/providers/primary").await?;
            output::finish(status, &body, json, |body| match body["provider"].as_object() {
                Some(provider) => {
                    println!("{}", "Primary provider:".bold());
                    output::field("UID", &provider["uid"]);
                    output::field("Identifier", provider["identifier"].as_str().unwrap_or_default());
                    output::field("Type", provider["adapterType"].as_str().unwrap_or_default());
                    output::field("Priority", &provider["priority"]);
                }
                None => println!("{}", "No active provider".yellow()),
            })
        }
    }
}

fn print_models(models: &Value) {
    let Some(models) = models.as_array() else {
        return;
    };
    println!("{}", format!("Models ({}):", models.len()).bold());
    for model in models {
        let id = model["id"].as_str().unwrap_or_default();
        match model["contextLength"].as_u64() {
            Some(context) => println!("  - {} {}", id, format!("({} tokens)", context).dimmed()),
            None => println!("  - {}", id),
        }
    }
}

pub fn print_toggle(entity: &str, uid: &str, body: &Value) {
    let state = if body["isActive"].as_bool().unwrap_or(false) {
        "active".green()
    } else {
        "inactive".yellow()
    };
    println!("{} {} is now {}", entity, uid, state);
}
