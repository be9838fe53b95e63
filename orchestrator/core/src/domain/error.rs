// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Engine error taxonomy
//!
//! Every failure that can reach a caller of the engine is expressed as an
//! [`EngineError`]. The `Display` text of each variant is the user-facing
//! message: short, no type names, no upstream response bodies, no credentials.
//! [`ErrorKind`] is the coarse class the presentation layer maps to a status
//! code.

use serde::Serialize;
use std::fmt;

use super::identifier::Uid;
use super::input::InputError;
use super::llm::LLMError;
use super::provider::CredentialError;
use super::repository::RepositoryError;

/// The catalog record types the engine works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Provider,
    Model,
    Configuration,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Provider => "Provider",
            EntityKind::Model => "Model",
            EntityKind::Configuration => "Configuration",
            EntityKind::Task => "Task",
        };
        f.write_str(name)
    }
}

/// Coarse failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingIdentifier,
    NotFound,
    NotConfigured,
    InvalidInput,
    Transport,
    ProviderRejected,
    Internal,
}

impl ErrorKind {
    /// HTTP status the surrounding layer reports for this class.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::MissingIdentifier | ErrorKind::NotConfigured | ErrorKind::InvalidInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Transport | ErrorKind::ProviderRejected | ErrorKind::Internal => 500,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("No {0} specified")]
    MissingIdentifier(&'static str),

    #[error("{entity} with UID {uid} not found")]
    NotFound { entity: EntityKind, uid: Uid },

    #[error("{0}")]
    NotConfigured(String),

    #[error("Unknown adapter type '{0}'")]
    AdapterUnknown(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    ProviderRejected(String),

    /// Detail is for logs only and never rendered.
    #[error("Internal storage error")]
    Storage(String),
}

impl EngineError {
    pub fn not_found(entity: EntityKind, uid: Uid) -> Self {
        EngineError::NotFound { entity, uid }
    }

    pub fn not_active(entity: EntityKind) -> Self {
        EngineError::NotConfigured(format!("{} is not active", entity))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::MissingIdentifier(_) => ErrorKind::MissingIdentifier,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::NotConfigured(_) | EngineError::AdapterUnknown(_) => {
                ErrorKind::NotConfigured
            }
            EngineError::InvalidInput(_) => ErrorKind::InvalidInput,
            EngineError::Transport(_) => ErrorKind::Transport,
            EngineError::ProviderRejected(_) => ErrorKind::ProviderRejected,
            EngineError::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<LLMError> for EngineError {
    fn from(err: LLMError) -> Self {
        let message = err.user_message();
        match err {
            LLMError::Network(_) | LLMError::Timeout(_) | LLMError::Provider(_) => {
                EngineError::Transport(message)
            }
            LLMError::Authentication(_) | LLMError::RateLimit | LLMError::ModelNotFound(_) => {
                EngineError::ProviderRejected(message)
            }
            LLMError::InvalidInput(_) => EngineError::InvalidInput(message),
        }
    }
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => EngineError::InvalidInput(message),
            other => EngineError::Storage(other.to_string()),
        }
    }
}

impl From<InputError> for EngineError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::MissingTable => EngineError::MissingIdentifier("table"),
            other => EngineError::InvalidInput(other.to_string()),
        }
    }
}

impl From<CredentialError> for EngineError {
    fn from(err: CredentialError) -> Self {
        EngineError::NotConfigured(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(EngineError::MissingIdentifier("task UID").kind().status_code(), 400);
        assert_eq!(
            EngineError::not_found(EntityKind::Task, Uid::new(9).unwrap())
                .kind()
                .status_code(),
            404
        );
        assert_eq!(EngineError::AdapterUnknown("x".into()).kind(), ErrorKind::NotConfigured);
        assert_eq!(EngineError::Transport("down".into()).kind().status_code(), 500);
    }

    #[test]
    fn test_not_found_message() {
        let err = EngineError::not_found(EntityKind::Provider, Uid::new(7).unwrap());
        assert_eq!(err.to_string(), "Provider with UID 7 not found");
    }

    #[test]
    fn test_not_active_message() {
        assert_eq!(
            EngineError::not_active(EntityKind::Task).to_string(),
            "Task is not active"
        );
    }

    #[test]
    fn test_storage_detail_hidden() {
        let err = EngineError::Storage("lock poisoned at store.rs:88".into());
        assert_eq!(err.to_string(), "Internal storage error");
    }

    #[test]
    fn test_llm_error_classification() {
        let err: EngineError = LLMError::RateLimit.into();
        assert_eq!(err.kind(), ErrorKind::ProviderRejected);
        assert!(err.to_string().to_lowercase().contains("rate"));

        let err: EngineError = LLMError::Timeout(Duration::from_secs(5)).into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("5"));

        let err: EngineError = LLMError::Authentication("bad key".into()).into();
        assert_eq!(err.kind(), ErrorKind::ProviderRejected);
    }
}
