// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod credentials;
pub mod input_sources;
pub mod llm;
pub mod prompt_template_engine;
pub mod repositories;
