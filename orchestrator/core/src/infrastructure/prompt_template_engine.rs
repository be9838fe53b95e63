// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Prompt Template Engine
//!
//! Renders task prompt templates by substituting `{{name}}` placeholders with
//! runtime variables.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Transform templates with placeholders into final prompts
//! - **Integration:** Task.prompt_template + resolved input → LLM prompt
//!
//! # Placeholder Rules
//!
//! - A placeholder is `{{ name }}` where `name` matches
//!   `[A-Za-z_][A-Za-z0-9_.-]*`; whitespace inside the braces is optional.
//! - Known names are replaced by their value, byte for byte.
//! - Unknown names are left in the output exactly as written.
//! - Substituted values are never scanned again, so a value containing
//!   `{{input}}` stays literal.
//!
//! # Common Placeholders
//!
//! - `{{input}}` - Resolved task input (manual text, record JSON, log lines)
//! - `{{table}}` - Source table for `records` inputs
//! - `{{count}}` - Number of records or log entries resolved
//!
//! # Usage
//!
//! ```
//! use std::collections::HashMap;
//! use switchboard_core::infrastructure::prompt_template_engine::build_prompt;
//!
//! let mut vars = HashMap::new();
//! vars.insert("input".to_string(), "the quarterly report".to_string());
//! let prompt = build_prompt("Summarize {{input}} for {{audience}}", &vars);
//! assert_eq!(prompt, "Summarize the quarterly report for {{audience}}");
//! ```

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Variables available to a template
pub type PromptVariables = HashMap<String, String>;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}")
            .expect("placeholder pattern is a valid regex")
    })
}

/// Render `template` in a single pass over its placeholders.
pub fn build_prompt(template: &str, variables: &PromptVariables) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Distinct placeholder names in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_pattern().captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Stateless renderer handed to the execution service.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptTemplateEngine;

impl PromptTemplateEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, template: &str, variables: &PromptVariables) -> String {
        build_prompt(template, variables)
    }

    /// Placeholders in `template` with no value in `variables`.
    pub fn unresolved(&self, template: &str, variables: &PromptVariables) -> Vec<String> {
        placeholders(template)
            .into_iter()
            .filter(|name| !variables.contains_key(name))
            .collect()
    }
}
