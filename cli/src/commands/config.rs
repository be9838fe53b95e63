// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use switchboard_core::domain::config::{SwitchboardConfig, CONFIG_PATH_ENV};
use switchboard_core::infrastructure::llm::AdapterRegistry;
use switchboard_core::infrastructure::prompt_template_engine::placeholders;
use switchboard_core::runtime::validate_config;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./switchboard-config.yaml)
        #[arg(short, long, default_value = "./switchboard-config.yaml")]
        output: PathBuf,

        /// Include example providers, configurations and tasks
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output, examples } => generate(output, examples),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = SwitchboardConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./switchboard-config.yaml");
        println!("  4. ~/.switchboard/config.yaml");
        println!("  5. /etc/switchboard/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    let spec = &config.spec;
    println!("{}", "Server:".bold());
    println!("  Listen: {}:{}", spec.server.bind_address, spec.server.port);
    println!();

    println!("{}", "Engine:".bold());
    println!("  Default timeout: {}s", spec.engine.default_timeout_seconds);
    println!(
        "  Records limit: {} (max {})",
        spec.engine.records_default_limit, spec.engine.records_max_limit
    );
    println!();

    let catalog = &spec.catalog;
    println!("{}", "Providers:".bold());
    for provider in &catalog.providers {
        let state = if provider.enabled { "".normal() } else { " (disabled)".yellow() };
        println!(
            "  {} ({}, priority {}){}",
            provider.identifier.bold(),
            provider.adapter_type,
            provider.priority,
            state
        );
        if !provider.endpoint.is_empty() {
            println!("    Endpoint: {}", provider.endpoint);
        }
        // only the reference is shown, never a literal key
        if let Some(key) = provider.api_key.as_deref().filter(|k| k.starts_with("env:")) {
            println!("    API key: {}", key);
        }
    }
    println!();

    println!("{}", "Models:".bold());
    for model in &catalog.models {
        let marker = if model.default { " [default]".green() } else { "".normal() };
        println!("  - {} → {} @ {}{}", model.identifier, model.model_id, model.provider, marker);
    }
    println!();

    println!("{}", "Configurations:".bold());
    for configuration in &catalog.configurations {
        let marker = if configuration.default { " [default]".green() } else { "".normal() };
        println!(
            "  - {} (model {}, temperature {}){}",
            configuration.identifier,
            configuration.model.as_deref().unwrap_or("(none)"),
            configuration.temperature,
            marker
        );
    }
    println!();

    println!("{}", "Tasks:".bold());
    for task in &catalog.tasks {
        println!("  - {} [{}]", task.identifier, task.input_type);
    }
    if !spec.records.is_empty() {
        let mut tables: Vec<&String> = spec.records.keys().collect();
        tables.sort();
        println!();
        println!("{}", "Record tables:".bold());
        for table in tables {
            println!("  - {} ({} rows)", table, spec.records[table].len());
        }
    }

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = SwitchboardConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    validate_config(&config, &AdapterRegistry::with_builtin_adapters())
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    let tasks = &config.spec.catalog.tasks;
    if !tasks.is_empty() {
        println!();
        println!("{}", "Task placeholders:".bold());
        for task in tasks {
            let names = placeholders(&task.prompt_template);
            if names.is_empty() {
                println!("  - {} {}", task.identifier, "(no placeholders)".yellow());
            } else {
                println!("  - {}: {}", task.identifier, names.join(", "));
            }
        }
    }

    Ok(())
}

fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_valid() {
        let registry = AdapterRegistry::with_builtin_adapters();
        for template in [
            include_str!("../../templates/config-minimal.yaml"),
            include_str!("../../templates/config-with-examples.yaml"),
        ] {
            let config = SwitchboardConfig::from_yaml_str(template).unwrap();
            validate_config(&config, &registry).unwrap();
        }
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchboard-config.yaml");
        generate(path.clone(), true).unwrap();

        let config = SwitchboardConfig::from_yaml_file(&path).unwrap();
        assert!(!config.spec.catalog.tasks.is_empty());
    }
}
