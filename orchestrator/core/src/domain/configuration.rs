// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Generation configuration
//!
//! A reusable bundle of model, sampling parameters and system prompt. Tasks
//! reference one; when none is referenced the catalog default is used.

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::identifier::Uid;

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub uid: Option<Uid>,
    pub identifier: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Without a model the configuration cannot be executed
    #[serde(default)]
    pub model_uid: Option<Uid>,

    pub temperature: f32,

    /// 0 lets the adapter choose
    #[serde(default)]
    pub max_tokens: u32,

    #[serde(default)]
    pub system_prompt: String,

    pub is_active: bool,

    #[serde(default)]
    pub is_default: bool,

    #[serde(default)]
    pub deleted: bool,
}

impl Configuration {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: None,
            identifier: identifier.into(),
            name: name.into(),
            description: String::new(),
            model_uid: None,
            temperature: 0.7,
            max_tokens: 0,
            system_prompt: String::new(),
            is_active: true,
            is_default: false,
            deleted: false,
        }
    }

    pub fn with_model(mut self, model_uid: Uid) -> Self {
        self.model_uid = Some(model_uid);
        self
    }

    /// Reject values the adapters cannot send.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.temperature.is_finite()
            || !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature)
        {
            return Err(EngineError::InvalidInput(format!(
                "Temperature must be between {:.1} and {:.1}",
                MIN_TEMPERATURE, MAX_TEMPERATURE
            )));
        }
        Ok(())
    }

    pub fn max_tokens_option(&self) -> Option<u32> {
        (self.max_tokens > 0).then_some(self.max_tokens)
    }

    pub fn system_prompt_option(&self) -> Option<String> {
        (!self.system_prompt.is_empty()).then(|| self.system_prompt.clone())
    }
}
