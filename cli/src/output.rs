// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Terminal rendering of API responses

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

/// Render a response. Failures (non-2xx or `success: false`) become errors so
/// the process exits non-zero.
pub fn finish(status: u16, body: &Value, json: bool, render: impl FnOnce(&Value)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(body)?);
    }

    let failed = !(200..300).contains(&status) || body["success"] == Value::Bool(false);
    if failed {
        let message = body["error"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("Request failed");
        anyhow::bail!("{}", message);
    }

    if !json {
        render(body);
    }
    Ok(())
}

pub fn success(message: &str) {
    println!("{}", format!("✓ {}", message).green());
}

pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", label.bold(), value);
}

/// Parse `key=value` pairs given on the command line.
pub fn parse_variable(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finish_maps_failures() {
        let err = finish(404, &json!({"success": false, "error": "Task with UID 9 not found"}), false, |_| {})
            .unwrap_err();
        assert_eq!(err.to_string(), "Task with UID 9 not found");

        let err = finish(200, &json!({"success": false, "message": "Could not reach provider"}), false, |_| {})
            .unwrap_err();
        assert_eq!(err.to_string(), "Could not reach provider");

        let mut rendered = false;
        finish(200, &json!({"success": true}), false, |_| rendered = true).unwrap();
        assert!(rendered);
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(
            parse_variable("audience=on-call team").unwrap(),
            ("audience".to_string(), "on-call team".to_string())
        );
        assert_eq!(parse_variable("eq=a=b").unwrap().1, "a=b");
        assert!(parse_variable("novalue").is_err());
        assert!(parse_variable("=x").is_err());
    }
}
