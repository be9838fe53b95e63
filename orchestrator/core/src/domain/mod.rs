// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Catalog entities, capability contracts and the engine error taxonomy.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure types and traits; no I/O

pub mod config;
pub mod configuration;
pub mod error;
pub mod identifier;
pub mod input;
pub mod llm;
pub mod model;
pub mod provider;
pub mod repository;
pub mod task;
