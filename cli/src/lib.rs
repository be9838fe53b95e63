// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Switchboard CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Command handlers, server mode and embedded engine

pub mod backend;
pub mod commands;
pub mod daemon;
pub mod embedded;
pub mod output;
