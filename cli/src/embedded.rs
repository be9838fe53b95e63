// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Embedded mode execution (when no server is running)
//!
//! Builds the engine in-process and drives the same HTTP routes through the
//! router directly, so both modes produce identical responses.

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use switchboard_core::domain::config::SwitchboardConfig;
use switchboard_core::runtime::SwitchboardRuntime;

pub struct EmbeddedEngine {
    router: Router,
}

impl EmbeddedEngine {
    pub async fn from_config(config: SwitchboardConfig) -> Result<Self> {
        let runtime = SwitchboardRuntime::from_config(config)
            .await
            .context("Failed to initialize engine")?;
        Ok(Self {
            router: runtime.router(),
        })
    }

    pub async fn request(&self, method: &str, route: &str, body: Option<&Value>) -> Result<(u16, Value)> {
        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(value)?),
            None => Body::empty(),
        };
        let request = Request::builder()
            .method(method)
            .uri(route)
            .header("content-type", "application/json")
            .body(body)
            .context("Failed to build request")?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .with_context(|| format!("Failed to call {}", route))?;

        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("Failed to read response body")?;
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse response from {}", route))?;
        Ok((status, value))
    }
}
