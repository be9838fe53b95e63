// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::identifier::Uid;

/// Where a task's `{{input}}` comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Manual,
    Records,
    Syslog,
    DeprecationLog,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Manual => "manual",
            InputType::Records => "records",
            InputType::Syslog => "syslog",
            InputType::DeprecationLog => "deprecation_log",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(InputType::Manual),
            "records" => Ok(InputType::Records),
            "syslog" => Ok(InputType::Syslog),
            "deprecation_log" | "deprecationlog" => Ok(InputType::DeprecationLog),
            other => Err(format!("Unknown input type '{}'", other)),
        }
    }
}

/// Advisory output format. The engine passes it through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
    Code,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub uid: Option<Uid>,
    pub identifier: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Template with `{{name}}` placeholders
    pub prompt_template: String,

    #[serde(default)]
    pub input_type: InputType,

    /// Source descriptor for non-manual input types
    #[serde(default)]
    pub input_source: serde_json::Value,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default)]
    pub configuration_uid: Option<Uid>,

    pub is_active: bool,

    /// Seeded by the system; read-only for operators
    #[serde(default)]
    pub is_system: bool,

    #[serde(default)]
    pub deleted: bool,
}

impl Task {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, prompt_template: impl Into<String>) -> Self {
        Self {
            uid: None,
            identifier: identifier.into(),
            name: name.into(),
            description: String::new(),
            prompt_template: prompt_template.into(),
            input_type: InputType::Manual,
            input_source: serde_json::Value::Null,
            output_format: OutputFormat::Text,
            configuration_uid: None,
            is_active: true,
            is_system: false,
            deleted: false,
        }
    }

    pub fn with_configuration(mut self, configuration_uid: Uid) -> Self {
        self.configuration_uid = Some(configuration_uid);
        self
    }

    pub fn with_input(mut self, input_type: InputType, input_source: serde_json::Value) -> Self {
        self.input_type = input_type;
        self.input_source = input_source;
        self
    }
}
