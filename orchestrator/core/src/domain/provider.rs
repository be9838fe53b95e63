// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Provider
//!
//! A configured endpoint + credential + adapter-type tuple. The API key is
//! carried as an opaque [`ApiKeySecret`]; only a [`CredentialStore`] turns the
//! stored form into something an adapter can send.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::identifier::Uid;

/// Timeout applied when a provider is configured with zero or a negative value.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Opaque credential. `Debug` and `Display` never print the value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeySecret(String);

impl ApiKeySecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("ApiKeySecret(<empty>)")
        } else {
            f.write_str("ApiKeySecret(***)")
        }
    }
}

impl fmt::Display for ApiKeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Decrypt-on-read accessor for stored provider credentials.
pub trait CredentialStore: Send + Sync {
    fn decrypt(&self, stored: &ApiKeySecret) -> Result<ApiKeySecret, CredentialError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialError {
    #[error("Provider API key reference '{0}' could not be resolved")]
    Unresolved(String),

    #[error("Provider API key could not be decrypted")]
    Decryption,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub uid: Option<Uid>,

    /// Unique, human-chosen key (e.g. "openai-prod")
    pub identifier: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Registry key selecting the adapter ("openai", "anthropic", ...)
    pub adapter_type: String,

    /// Empty means "use the adapter's default endpoint"
    #[serde(default)]
    pub endpoint_url: String,

    /// Stored form; never serialized back out
    #[serde(default, skip_serializing)]
    pub api_key: ApiKeySecret,

    #[serde(default)]
    pub timeout_seconds: i64,

    /// Higher is preferred
    #[serde(default)]
    pub priority: i64,

    pub is_active: bool,

    #[serde(default)]
    pub deleted: bool,
}

impl Provider {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        adapter_type: impl Into<String>,
    ) -> Self {
        Self {
            uid: None,
            identifier: identifier.into(),
            name: name.into(),
            description: String::new(),
            adapter_type: adapter_type.into(),
            endpoint_url: String::new(),
            api_key: ApiKeySecret::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS as i64,
            priority: 0,
            is_active: true,
            deleted: false,
        }
    }

    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: ApiKeySecret) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: i64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Configured timeout, or `fallback_seconds` when the configured value is not positive.
    pub fn effective_timeout(&self, fallback_seconds: u64) -> Duration {
        if self.timeout_seconds > 0 {
            Duration::from_secs(self.timeout_seconds as u64)
        } else {
            Duration::from_secs(fallback_seconds.max(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_never_printed() {
        let secret = ApiKeySecret::new("sk-very-secret");
        assert_eq!(format!("{:?}", secret), "ApiKeySecret(***)");
        assert_eq!(format!("{}", secret), "***");

        let provider = Provider::new("p", "P", "openai").with_api_key(secret);
        assert!(!format!("{:?}", provider).contains("sk-very-secret"));
        assert!(!serde_json::to_string(&provider).unwrap().contains("sk-very-secret"));
    }

    #[test]
    fn test_timeout_normalization() {
        let provider = Provider::new("p", "P", "openai").with_timeout_seconds(0);
        assert_eq!(provider.effective_timeout(30), Duration::from_secs(30));

        let provider = provider.with_timeout_seconds(-10);
        assert_eq!(provider.effective_timeout(30), Duration::from_secs(30));

        let provider = provider.with_timeout_seconds(12);
        assert_eq!(provider.effective_timeout(30), Duration::from_secs(12));
    }

    #[test]
    fn test_unicode_roundtrip() {
        let mut provider = Provider::new("unicode", "模型提供者 🚀", "openai");
        provider.description = "日本語の説明 ✨ émoji".to_string();

        let json = serde_json::to_string(&provider).unwrap();
        let parsed: Provider = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name.as_bytes(), provider.name.as_bytes());
        assert_eq!(parsed.description.as_bytes(), provider.description.as_bytes());
    }
}
