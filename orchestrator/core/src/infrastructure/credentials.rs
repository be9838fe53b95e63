// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Credential Store
//!
//! Reference implementation of the decrypt-on-read credential accessor.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Turn stored provider API keys into usable secrets
//!
//! # Stored Forms
//!
//! - `""` - no credential (local providers such as Ollama)
//! - `"env:VAR_NAME"` - read from the process environment at call time
//! - anything else - used as-is

use std::collections::HashMap;

use crate::domain::provider::{ApiKeySecret, CredentialError, CredentialStore};

const ENV_PREFIX: &str = "env:";

/// Resolves `env:` references against the environment.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialStore {
    /// Consulted before the process environment
    overrides: HashMap<String, String>,
}

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `env:` lookups see `vars` ahead of the real environment.
    pub fn with_overrides(vars: HashMap<String, String>) -> Self {
        Self { overrides: vars }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }
}

impl CredentialStore for EnvCredentialStore {
    fn decrypt(&self, stored: &ApiKeySecret) -> Result<ApiKeySecret, CredentialError> {
        let raw = stored.expose_secret().trim();
        match raw.strip_prefix(ENV_PREFIX) {
            Some(var_name) => {
                let var_name = var_name.trim();
                self.lookup(var_name)
                    .filter(|value| !value.is_empty())
                    .map(ApiKeySecret::new)
                    .ok_or_else(|| CredentialError::Unresolved(format!("{}{}", ENV_PREFIX, var_name)))
            }
            None => Ok(ApiKeySecret::new(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EnvCredentialStore {
        let mut vars = HashMap::new();
        vars.insert("SWITCHBOARD_TEST_KEY".to_string(), "sk-from-env".to_string());
        EnvCredentialStore::with_overrides(vars)
    }

    #[test]
    fn test_plain_value_passthrough() {
        let secret = store().decrypt(&ApiKeySecret::new("sk-plain")).unwrap();
        assert_eq!(secret.expose_secret(), "sk-plain");
    }

    #[test]
    fn test_empty_value_is_empty_secret() {
        let secret = store().decrypt(&ApiKeySecret::default()).unwrap();
        assert!(secret.is_empty());
    }

    #[test]
    fn test_env_reference() {
        let secret = store()
            .decrypt(&ApiKeySecret::new("env:SWITCHBOARD_TEST_KEY"))
            .unwrap();
        assert_eq!(secret.expose_secret(), "sk-from-env");
    }

    #[test]
    fn test_missing_env_reference() {
        let err = store()
            .decrypt(&ApiKeySecret::new("env:SWITCHBOARD_SURELY_UNSET_VAR_4711"))
            .unwrap_err();
        assert!(matches!(err, CredentialError::Unresolved(_)));
        assert!(err.to_string().contains("SWITCHBOARD_SURELY_UNSET_VAR_4711"));
    }
}
