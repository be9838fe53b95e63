// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command backend: a running server when one answers the health check,
//! otherwise an in-process engine.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

use switchboard_core::domain::config::SwitchboardConfig;

use crate::daemon::{self, ServerClient, ServerStatus};
use crate::embedded::EmbeddedEngine;

pub enum Backend {
    Server(ServerClient),
    Embedded(Box<EmbeddedEngine>),
}

impl Backend {
    pub async fn connect(
        config_path: Option<PathBuf>,
        host: Option<String>,
        port: Option<u16>,
        embedded_only: bool,
    ) -> Result<Self> {
        let config = SwitchboardConfig::load_or_default(config_path)
            .context("Failed to load configuration")?;

        if !embedded_only {
            let server = &config.spec.server;
            let base_url = daemon::base_url(
                host.as_deref().unwrap_or(&server.bind_address),
                port.unwrap_or(server.port),
            );

            match daemon::check_server_running(&base_url).await {
                ServerStatus::Running { version } => {
                    info!(
                        "Delegating to server at {} (version {})",
                        base_url,
                        version.as_deref().unwrap_or("unknown")
                    );
                    return Ok(Backend::Server(ServerClient::new(base_url)?));
                }
                ServerStatus::Unhealthy { error } => {
                    warn!("Server at {} is unhealthy ({}), using embedded mode", base_url, error);
                }
                ServerStatus::Stopped => {
                    info!("Server not running, using embedded mode");
                }
            }
        }

        Ok(Backend::Embedded(Box::new(EmbeddedEngine::from_config(config).await?)))
    }

    pub async fn post(&self, route: &str, body: Value) -> Result<(u16, Value)> {
        match self {
            Backend::Server(client) => client.post(route, &body).await,
            Backend::Embedded(engine) => engine.request("POST", route, Some(&body)).await,
        }
    }

    pub async fn get(&self, route: &str) -> Result<(u16, Value)> {
        match self {
            Backend::Server(client) => client.get(route).await,
            Backend::Embedded(engine) => engine.request("GET", route, None).await,
        }
    }
}
