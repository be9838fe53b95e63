// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Switchboard Core
//!
//! Provider adapter dispatch and task execution engine.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, application services, provider adapters and
//!   the HTTP surface, composed by [`runtime::SwitchboardRuntime`]

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
pub mod runtime;

pub use domain::*;
