// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server implementation

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use switchboard_core::domain::config::SwitchboardConfig;
use switchboard_core::runtime::SwitchboardRuntime;

pub async fn start_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    metrics_port: Option<u16>,
) -> Result<()> {
    let config = SwitchboardConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    let bind_address = host.unwrap_or_else(|| config.spec.server.bind_address.clone());
    let port = port.unwrap_or(config.spec.server.port);

    info!("Configuration loaded: {}", config.metadata.name);

    if let Some(metrics_port) = metrics_port {
        let addr: SocketAddr = format!("{}:{}", bind_address, metrics_port)
            .parse()
            .with_context(|| format!("Invalid metrics address {}:{}", bind_address, metrics_port))?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Metrics exporter listening on {}", addr);
    }

    let runtime = SwitchboardRuntime::from_config(config)
        .await
        .context("Failed to initialize engine")?;

    let app = runtime.router().layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", bind_address, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Switchboard listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Switchboard shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
