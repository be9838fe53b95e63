// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Switchboard CLI
//!
//! The `switchboard` binary runs tasks against configured LLM providers and
//! serves the HTTP API.
//!
//! ## Architecture
//!
//! - **Server mode**: `switchboard serve` runs the HTTP API in the foreground
//! - **Default mode**: commands delegate to a running server, else build the
//!   engine in-process from the configuration file
//! - **Detection**: HTTP health check against `--host`/`--port`
//!
//! ## Commands
//!
//! - `switchboard task run` - Execute a task
//! - `switchboard configuration test|default` - Configuration operations
//! - `switchboard provider test|models|toggle|primary` - Provider diagnostics
//! - `switchboard model toggle|default|limits` - Model operations
//! - `switchboard config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use switchboard::commands::{
    self, ConfigCommand, ConfigurationCommand, ModelCommand, ProviderCommand, TaskCommand,
};
use switchboard::backend::Backend;
use switchboard::daemon;

/// Switchboard - route tasks to LLM providers
#[derive(Parser)]
#[command(name = "switchboard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "SWITCHBOARD_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API port (default: from configuration, 8080)
    #[arg(long, global = true, env = "SWITCHBOARD_PORT")]
    port: Option<u16>,

    /// HTTP API host (default: from configuration, 127.0.0.1)
    #[arg(long, global = true, env = "SWITCHBOARD_HOST")]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SWITCHBOARD_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    json: bool,

    /// Never delegate to a running server
    #[arg(long, global = true)]
    embedded: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    #[command(name = "serve")]
    Serve {
        /// Expose Prometheus metrics on this port
        #[arg(long, env = "SWITCHBOARD_METRICS_PORT")]
        metrics_port: Option<u16>,
    },

    /// Task operations
    #[command(name = "task")]
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Generation configuration operations
    #[command(name = "configuration")]
    Configuration {
        #[command(subcommand)]
        command: ConfigurationCommand,
    },

    /// Provider diagnostics
    #[command(name = "provider")]
    Provider {
        #[command(subcommand)]
        command: ProviderCommand,
    },

    /// Model operations
    #[command(name = "model")]
    Model {
        #[command(subcommand)]
        command: ModelCommand,
    },

    /// Configuration file management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    };

    let connect = || Backend::connect(cli.config.clone(), cli.host.clone(), cli.port, cli.embedded);

    match command {
        Commands::Serve { metrics_port } => {
            daemon::start_server(cli.config.clone(), cli.host.clone(), cli.port, metrics_port).await
        }
        Commands::Config { command } => commands::config::handle_command(command, cli.config.clone()).await,
        Commands::Task { command } => {
            commands::task::handle_command(command, &connect().await?, cli.json).await
        }
        Commands::Configuration { command } => {
            commands::configuration::handle_command(command, &connect().await?, cli.json).await
        }
        Commands::Provider { command } => {
            commands::provider::handle_command(command, &connect().await?, cli.json).await
        }
        Commands::Model { command } => {
            commands::model::handle_command(command, &connect().await?, cli.json).await
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
