// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// Switchboard Configuration Manifest
//
// Defines the configuration schema for a Switchboard node, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP server binding
// - Engine tuning (timeouts, record paging)
// - Catalog seed (providers, models, configurations, tasks by identifier)
// - Inline record tables and log file locations for task inputs

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::provider::DEFAULT_TIMEOUT_SECONDS;
use super::task::{InputType, OutputFormat};

pub const API_VERSION: &str = "switchboard.dev/v1";
pub const MANIFEST_KIND: &str = "SwitchboardConfig";
pub const CONFIG_PATH_ENV: &str = "SWITCHBOARD_CONFIG_PATH";

/// Top-level configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchboardConfig {
    /// API version (must be "switchboard.dev/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "SwitchboardConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: SwitchboardSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable node name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchboardSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub engine: EngineSettings,

    /// Records loaded into the catalog at startup
    #[serde(default)]
    pub catalog: CatalogSeed,

    /// Inline tables served to `records` tasks
    #[serde(default)]
    pub records: HashMap<String, Vec<serde_json::Value>>,

    #[serde(default)]
    pub logs: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Applied to providers configured with a non-positive timeout
    #[serde(default = "default_timeout_seconds")]
    pub default_timeout_seconds: u64,

    /// Page size for `records` inputs when the request gives none
    #[serde(default = "default_records_limit")]
    pub records_default_limit: usize,

    /// Hard cap on `records` page size
    #[serde(default = "default_records_max_limit")]
    pub records_max_limit: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syslog_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub providers: Vec<ProviderSeed>,

    #[serde(default)]
    pub models: Vec<ModelSeed>,

    #[serde(default)]
    pub configurations: Vec<ConfigurationSeed>,

    #[serde(default)]
    pub tasks: Vec<TaskSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSeed {
    pub identifier: String,

    pub name: String,

    /// Adapter type ("openai", "anthropic", "ollama", "gemini", "deepseek", ...)
    #[serde(rename = "type")]
    pub adapter_type: String,

    #[serde(default)]
    pub endpoint: String,

    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub priority: i64,

    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: i64,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSeed {
    pub identifier: String,

    /// Identifier of the owning provider seed
    pub provider: String,

    pub model_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub context_length: u32,

    #[serde(default)]
    pub max_output_tokens: u32,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationSeed {
    pub identifier: String,

    pub name: String,

    /// Identifier of a model seed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub max_tokens: u32,

    #[serde(default)]
    pub system_prompt: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSeed {
    pub identifier: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub prompt_template: String,

    #[serde(default)]
    pub input_type: InputType,

    #[serde(default)]
    pub input_source: serde_json::Value,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Identifier of a configuration seed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub system: bool,
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_provider_timeout() -> i64 {
    DEFAULT_TIMEOUT_SECONDS as i64
}

fn default_records_limit() -> usize {
    50
}

fn default_records_max_limit() -> usize {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_timeout_seconds: default_timeout_seconds(),
            records_default_limit: default_records_limit(),
            records_max_limit: default_records_max_limit(),
        }
    }
}

impl Default for SwitchboardConfig {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: MANIFEST_KIND.to_string(),
            metadata: ManifestMetadata {
                name: "switchboard".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: SwitchboardSpec::default(),
        }
    }
}

impl SwitchboardConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. SWITCHBOARD_CONFIG_PATH environment variable
    /// 2. ./switchboard-config.yaml (working directory)
    /// 3. ~/.switchboard/config.yaml (user home)
    /// 4. /etc/switchboard/config.yaml (system, Unix) or C:\ProgramData\Switchboard\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./switchboard-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".switchboard").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/switchboard/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Switchboard\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using empty defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SWITCHBOARD_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: SWITCHBOARD_PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => tracing::warn!(
                    "Invalid value for SWITCHBOARD_PORT: '{}'. Expected a port number. Ignoring.",
                    val
                ),
            }
        }

        if let Ok(val) = std::env::var("SWITCHBOARD_DEFAULT_TIMEOUT") {
            match val.parse::<u64>() {
                Ok(seconds) if seconds > 0 => {
                    tracing::info!("Environment override: SWITCHBOARD_DEFAULT_TIMEOUT={}", seconds);
                    self.spec.engine.default_timeout_seconds = seconds;
                }
                _ => tracing::warn!(
                    "Invalid value for SWITCHBOARD_DEFAULT_TIMEOUT: '{}'. Expected positive seconds. Ignoring.",
                    val
                ),
            }
        }
    }

    /// Validate configuration structure and seed references
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != MANIFEST_KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, MANIFEST_KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let engine = &self.spec.engine;
        if engine.default_timeout_seconds == 0 {
            anyhow::bail!("spec.engine.default_timeout_seconds must be positive");
        }
        if engine.records_default_limit == 0 || engine.records_default_limit > engine.records_max_limit {
            anyhow::bail!(
                "spec.engine.records_default_limit must be between 1 and records_max_limit ({})",
                engine.records_max_limit
            );
        }

        let catalog = &self.spec.catalog;
        let providers = unique_identifiers("provider", catalog.providers.iter().map(|p| &p.identifier))?;
        let models = unique_identifiers("model", catalog.models.iter().map(|m| &m.identifier))?;
        let configurations = unique_identifiers(
            "configuration",
            catalog.configurations.iter().map(|c| &c.identifier),
        )?;
        unique_identifiers("task", catalog.tasks.iter().map(|t| &t.identifier))?;

        for provider in &catalog.providers {
            if provider.adapter_type.trim().is_empty() {
                anyhow::bail!("Provider '{}' has no type", provider.identifier);
            }
        }

        for model in &catalog.models {
            if !providers.contains(model.provider.as_str()) {
                anyhow::bail!(
                    "Model '{}' references unknown provider '{}'",
                    model.identifier,
                    model.provider
                );
            }
            if model.model_id.is_empty() {
                anyhow::bail!("Model '{}' has an empty model_id", model.identifier);
            }
        }

        for config in &catalog.configurations {
            if let Some(model) = &config.model {
                if !models.contains(model.as_str()) {
                    anyhow::bail!(
                        "Configuration '{}' references unknown model '{}'",
                        config.identifier,
                        model
                    );
                }
            }
            if !config.temperature.is_finite() || !(0.0..=2.0).contains(&config.temperature) {
                anyhow::bail!(
                    "Configuration '{}' temperature must be between 0.0 and 2.0",
                    config.identifier
                );
            }
        }

        for task in &catalog.tasks {
            if let Some(config) = &task.configuration {
                if !configurations.contains(config.as_str()) {
                    anyhow::bail!(
                        "Task '{}' references unknown configuration '{}'",
                        task.identifier,
                        config
                    );
                }
            }
        }

        if catalog.models.iter().filter(|m| m.default).count() > 1 {
            anyhow::bail!("At most one model may be marked default");
        }
        if catalog.configurations.iter().filter(|c| c.default).count() > 1 {
            anyhow::bail!("At most one configuration may be marked default");
        }

        Ok(())
    }

    /// Distinct adapter types referenced by the provider seeds
    pub fn adapter_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .spec
            .catalog
            .providers
            .iter()
            .map(|p| p.adapter_type.trim().to_ascii_lowercase())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

fn unique_identifiers<'a>(
    label: &str,
    identifiers: impl Iterator<Item = &'a String>,
) -> anyhow::Result<HashSet<&'a str>> {
    let mut seen = HashSet::new();
    for identifier in identifiers {
        if identifier.trim().is_empty() {
            anyhow::bail!("A {} identifier cannot be empty", label);
        }
        if !seen.insert(identifier.as_str()) {
            anyhow::bail!("Duplicate {} identifier '{}'", label, identifier);
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
apiVersion: switchboard.dev/v1
kind: SwitchboardConfig
metadata:
  name: test-node
spec:
  server:
    port: 9090
  catalog:
    providers:
      - identifier: local
        name: Local Ollama
        type: ollama
        endpoint: http://localhost:11434
        priority: 10
    models:
      - identifier: llama
        provider: local
        model_id: llama3.2:latest
        default: true
    configurations:
      - identifier: balanced
        name: Balanced
        model: llama
        temperature: 0.4
        system_prompt: "Antworte kurz. 简洁 ✅"
        default: true
    tasks:
      - identifier: summarize
        name: Summarize
        prompt_template: "Summarize: {{input}}"
        configuration: balanced
  records:
    incidents:
      - id: 1
        title: Outage
"#;

    #[test]
    fn test_default_manifest() {
        let manifest = SwitchboardConfig::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, MANIFEST_KIND);
        assert_eq!(manifest.spec.server.port, 8080);
        assert!(manifest.spec.catalog.providers.is_empty());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_parse_sample() {
        let config = SwitchboardConfig::from_yaml_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.spec.server.port, 9090);
        assert_eq!(config.spec.server.bind_address, "127.0.0.1");
        assert_eq!(config.spec.catalog.providers[0].timeout_seconds, 30);
        assert!(config.spec.catalog.providers[0].enabled);
        assert_eq!(config.spec.catalog.tasks[0].input_type, InputType::Manual);
        assert_eq!(
            config.spec.catalog.configurations[0].system_prompt,
            "Antworte kurz. 简洁 ✅"
        );
        assert_eq!(config.spec.records["incidents"].len(), 1);
        assert_eq!(config.adapter_types(), vec!["ollama".to_string()]);
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchboard-config.yaml");

        let config = SwitchboardConfig::from_yaml_str(SAMPLE).unwrap();
        config.to_yaml_file(&path).unwrap();

        let loaded = SwitchboardConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.metadata.name, "test-node");
        assert_eq!(loaded.spec.catalog.models[0].model_id, "llama3.2:latest");
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SwitchboardConfig::load_or_default(Some(dir.path().join("absent.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        let mut manifest = SwitchboardConfig::from_yaml_str(SAMPLE).unwrap();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "WrongKind".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = MANIFEST_KIND.to_string();

        manifest.spec.catalog.models[0].provider = "missing".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.catalog.models[0].provider = "local".to_string();

        let duplicate = manifest.spec.catalog.tasks[0].clone();
        manifest.spec.catalog.tasks.push(duplicate);
        assert!(manifest.validate().is_err());
        manifest.spec.catalog.tasks.pop();

        manifest.spec.catalog.configurations[0].temperature = 3.0;
        assert!(manifest.validate().is_err());
        manifest.spec.catalog.configurations[0].temperature = 0.4;

        assert!(manifest.validate().is_ok());
    }
}
