// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Switchboard CLI

pub mod config;
pub mod configuration;
pub mod model;
pub mod provider;
pub mod task;

pub use self::config::ConfigCommand;
pub use self::configuration::ConfigurationCommand;
pub use self::model::ModelCommand;
pub use self::provider::ProviderCommand;
pub use self::task::TaskCommand;
