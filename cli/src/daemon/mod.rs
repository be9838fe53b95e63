// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Server mode
//!
//! Handles:
//! - Running the HTTP API in the foreground
//! - HTTP health checks used to decide between delegation and embedded mode
//! - Graceful shutdown

use std::time::Duration;

pub mod client;
pub mod server;

pub use client::ServerClient;
pub use server::start_server;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Running { version: Option<String> },
    Unhealthy { error: String },
    Stopped,
}

/// `http://host:port`, keeping an explicit scheme when one is given
pub fn base_url(host: &str, port: u16) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}:{}", host.trim_end_matches('/'), port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

/// Probe `GET /health` on a running server.
pub async fn check_server_running(base_url: &str) -> ServerStatus {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_millis(500))
        .build()
    {
        Ok(client) => client,
        Err(e) => return ServerStatus::Unhealthy { error: e.to_string() },
    };

    match client.get(format!("{}/health", base_url)).send().await {
        Ok(resp) if resp.status().is_success() => {
            let version = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["version"].as_str().map(str::to_string));
            ServerStatus::Running { version }
        }
        Ok(resp) => ServerStatus::Unhealthy {
            error: format!("HTTP {}", resp.status()),
        },
        Err(_) => ServerStatus::Stopped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("127.0.0.1", 8080), "http://127.0.0.1:8080");
        assert_eq!(base_url("https://switchboard.internal/", 443), "https://switchboard.internal:443");
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"ok","version":"0.3.0"}"#)
            .create_async()
            .await;

        assert_eq!(
            check_server_running(&server.url()).await,
            ServerStatus::Running {
                version: Some("0.3.0".to_string())
            }
        );
        assert_eq!(check_server_running("http://127.0.0.1:1").await, ServerStatus::Stopped);
    }
}
