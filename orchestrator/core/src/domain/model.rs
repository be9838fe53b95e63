// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

use super::identifier::Uid;

/// A provider-native model registered in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub uid: Option<Uid>,
    pub identifier: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Owning provider. A model whose provider is gone is unusable.
    pub provider_uid: Uid,

    /// Identifier sent to the provider API (e.g. "gpt-4o", "llama3.2:latest")
    pub model_id: String,

    #[serde(default)]
    pub context_length: u32,

    #[serde(default)]
    pub max_output_tokens: u32,

    pub is_active: bool,

    #[serde(default)]
    pub is_default: bool,

    #[serde(default)]
    pub deleted: bool,
}

impl Model {
    pub fn new(identifier: impl Into<String>, provider_uid: Uid, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        Self {
            uid: None,
            identifier: identifier.into(),
            name: model_id.clone(),
            description: String::new(),
            provider_uid,
            model_id,
            context_length: 0,
            max_output_tokens: 0,
            is_active: true,
            is_default: false,
            deleted: false,
        }
    }

    pub fn with_limits(mut self, context_length: u32, max_output_tokens: u32) -> Self {
        self.context_length = context_length;
        self.max_output_tokens = max_output_tokens;
        self
    }
}
