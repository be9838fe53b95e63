// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for communicating with a running server

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Executions can legitimately take minutes; the server enforces provider timeouts.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct ServerClient {
    client: Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn post(&self, route: &str, body: &Value) -> Result<(u16, Value)> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, route))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to call {}", route))?;
        Self::read(route, response).await
    }

    pub async fn get(&self, route: &str) -> Result<(u16, Value)> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, route))
            .send()
            .await
            .with_context(|| format!("Failed to call {}", route))?;
        Self::read(route, response).await
    }

    async fn read(route: &str, response: reqwest::Response) -> Result<(u16, Value)> {
        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .with_context(|| format!("Failed to parse response from {}", route))?;
        Ok((status, body))
    }
}
