// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod catalog;
pub mod diagnostics;
pub mod dispatch;
pub mod execution;
pub mod input_resolution;
pub mod provider_selector;

// Re-export services for convenience
pub use catalog::CatalogService;
pub use diagnostics::ProviderDiagnostics;
pub use dispatch::AdapterDispatcher;
pub use execution::{
    ExecuteTaskRequest, ExecutionResponse, StandardTaskExecutionService, TaskExecutionService,
    TestConfigurationRequest,
};
pub use input_resolution::{InputResolver, TaskInput};
