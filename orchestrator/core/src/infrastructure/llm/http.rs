// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// Shared HTTP plumbing for provider adapters
//
// Status mapping and error sanitization live here so every adapter reports
// failures the same way. Provider response bodies are never forwarded; only
// the provider's own error message field survives, truncated.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::domain::llm::LLMError;

/// Longest provider error message kept in an [`LLMError`]
pub(crate) const MAX_ERROR_MESSAGE_CHARS: usize = 200;

/// Send `request` bounded by `timeout` and map non-2xx statuses.
///
/// `model_id` names the model a 404 refers to. Listing endpoints pass `None`,
/// in which case a 404 is reported as a provider error.
pub(crate) async fn send(
    request: RequestBuilder,
    timeout: Duration,
    model_id: Option<&str>,
) -> Result<Response, LLMError> {
    let response = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body, model_id))
}

/// Decode a successful response body.
pub(crate) async fn json_body<T: DeserializeOwned>(
    response: Response,
    timeout: Duration,
) -> Result<T, LLMError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            LLMError::Timeout(timeout)
        } else {
            LLMError::Provider("Malformed response from provider".to_string())
        }
    })
}

pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> LLMError {
    if err.is_timeout() {
        LLMError::Timeout(timeout)
    } else if err.is_connect() {
        LLMError::Network("connection failed".to_string())
    } else {
        LLMError::Network(err.without_url().to_string())
    }
}

pub(crate) fn status_error(status: StatusCode, body: &str, model_id: Option<&str>) -> LLMError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 | 403 => LLMError::Authentication(
            message.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        ),
        429 => LLMError::RateLimit,
        404 => match model_id {
            Some(model) => LLMError::ModelNotFound(model.to_string()),
            None => LLMError::Provider("HTTP 404".to_string()),
        },
        code => match message {
            Some(message) => LLMError::Provider(format!("HTTP {}: {}", code, message)),
            None => LLMError::Provider(format!("HTTP {}", code)),
        },
    }
}

/// Pull `error.message` (or a top-level `message`/string `error`) out of an
/// error body.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value
        .get("error")
        .and_then(|e| e.get("message").and_then(|m| m.as_str()).or_else(|| e.as_str()))
        .or_else(|| value.get("message").and_then(|m| m.as_str()))?;

    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    Some(truncate_chars(message, MAX_ERROR_MESSAGE_CHARS))
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_nested_message() {
        let body = r#"{"error":{"message":"Invalid model","type":"invalid_request_error"}}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("Invalid model"));
    }

    #[test]
    fn test_extract_flat_shapes() {
        assert_eq!(
            extract_error_message(r#"{"error":"model 'x' not found"}"#).as_deref(),
            Some("model 'x' not found")
        );
        assert_eq!(
            extract_error_message(r#"{"message":"overloaded"}"#).as_deref(),
            Some("overloaded")
        );
        assert_eq!(extract_error_message("<html>502 Bad Gateway</html>"), None);
    }

    #[test]
    fn test_long_messages_truncated() {
        let long = "é".repeat(500);
        let body = serde_json::json!({ "error": { "message": long } }).to_string();
        let message = extract_error_message(&body).unwrap();
        assert_eq!(message.chars().count(), MAX_ERROR_MESSAGE_CHARS + 3);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "", None),
            LLMError::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "", None),
            LLMError::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "", None),
            LLMError::RateLimit
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "", Some("gpt-9")),
            LLMError::ModelNotFound(m) if m == "gpt-9"
        ));
        match status_error(StatusCode::BAD_GATEWAY, "upstream sk-secret-echo", None) {
            LLMError::Provider(detail) => {
                assert_eq!(detail, "HTTP 502");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
