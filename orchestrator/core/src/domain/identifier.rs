// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Catalog identifiers
//!
//! Every catalog record (provider, model, configuration, task) is addressed by a
//! positive integer [`Uid`] assigned by the entity store. Request parameters
//! arrive untyped (JSON numbers, strings, sometimes garbage), so this module
//! owns the single normalization rule: anything that is not a positive integer
//! is treated as "no identifier supplied".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::EngineError;

/// Positive store-assigned identifier of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(u64);

impl Uid {
    /// Returns `None` for zero.
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Parse a textual identifier. Only plain ASCII digits (surrounding
    /// whitespace allowed) are accepted; signs, decimals and values that
    /// overflow `u64` are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        trimmed.parse::<u64>().ok().and_then(Self::new)
    }

    /// Normalize an untyped request parameter.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            // as_u64 is None for negatives and for any float representation
            Value::Number(number) => number.as_u64().and_then(Self::new),
            Value::String(text) => Self::parse(text),
            _ => None,
        }
    }

    /// Normalize a request parameter that must be present.
    ///
    /// `field` names the parameter in the user-facing error, e.g.
    /// `"provider UID"` yields "No provider UID specified".
    pub fn require(raw: Option<&Value>, field: &'static str) -> Result<Self, EngineError> {
        raw.and_then(Self::from_value)
            .ok_or(EngineError::MissingIdentifier(field))
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
