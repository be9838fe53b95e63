// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the domain LLMAdapter interface and one
// vendor API family.

pub mod anthropic;
pub mod gemini;
mod http;
pub mod ollama;
pub mod openai;
pub mod registry;

pub use registry::AdapterRegistry;
