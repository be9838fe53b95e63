// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Task Execution
//!
//! Runs a task (or a bare configuration test) against the configured
//! provider and normalizes every outcome into one [`ExecutionResponse`].
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Execution engine root: configuration resolution, provider
//!   and adapter resolution, prompt build, adapter dispatch, normalization
//!
//! # Execution States
//!
//! ```text
//! Validating -> Resolving -> Building -> Dispatching -> Normalizing -> {Succeeded, Failed}
//! ```
//!
//! Each transition is logged at `debug` inside a span carrying the
//! execution id. Executions are independent: nothing is cached between calls
//! and every call returns exactly one response.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::application::dispatch::AdapterDispatcher;
use crate::application::input_resolution::{InputResolver, TaskInput};
use crate::domain::configuration::Configuration;
use crate::domain::error::{EngineError, EntityKind, ErrorKind};
use crate::domain::identifier::Uid;
use crate::domain::llm::{Completion, CompletionOptions, LLMError, TokenUsage};
use crate::domain::model::Model;
use crate::domain::provider::Provider;
use crate::domain::repository::Catalog;
use crate::infrastructure::prompt_template_engine::PromptTemplateEngine;

/// Prompt used by configuration tests when the caller gives none
pub const DEFAULT_TEST_PROMPT: &str = "Hello! Please respond with a short greeting.";

/// Extra time granted on top of the provider timeout before the call is abandoned
const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutionState {
    Validating,
    Resolving,
    Building,
    Dispatching,
    Normalizing,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Validating => "validating",
            ExecutionState::Resolving => "resolving",
            ExecutionState::Building => "building",
            ExecutionState::Dispatching => "dispatching",
            ExecutionState::Normalizing => "normalizing",
        };
        f.write_str(name)
    }
}

fn transition(state: ExecutionState) {
    debug!(state = %state, "Execution state transition");
}

/// Request to run one task. Identifiers are kept raw and normalized during
/// validation.
#[derive(Debug, Clone, Default)]
pub struct ExecuteTaskRequest {
    pub uid: Option<Value>,

    /// Overrides the task's configuration; malformed values count as absent
    pub configuration_uid: Option<Value>,

    pub input: TaskInput,
}

#[derive(Debug, Clone, Default)]
pub struct TestConfigurationRequest {
    pub uid: Option<Value>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSuccess {
    pub success: bool,
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    /// Wall-clock seconds, rounded to milliseconds
    pub execution_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionFailure {
    pub success: bool,
    pub error: String,
    #[serde(skip)]
    pub kind: ErrorKind,
}

/// Normalized result of an execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExecutionResponse {
    Success(ExecutionSuccess),
    Failure(ExecutionFailure),
}

impl ExecutionResponse {
    pub fn failure(error: &EngineError) -> Self {
        ExecutionResponse::Failure(ExecutionFailure {
            success: false,
            error: error.to_string(),
            kind: error.kind(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResponse::Success(_))
    }

    /// HTTP status for this response
    pub fn status_code(&self) -> u16 {
        match self {
            ExecutionResponse::Success(_) => 200,
            ExecutionResponse::Failure(failure) => failure.kind.status_code(),
        }
    }
}

#[async_trait]
pub trait TaskExecutionService: Send + Sync {
    /// Run a task end to end
    async fn execute_task(&self, request: ExecuteTaskRequest) -> ExecutionResponse;

    /// Send a test prompt through a configuration, bypassing tasks
    async fn test_configuration(&self, request: TestConfigurationRequest) -> ExecutionResponse;
}

pub struct StandardTaskExecutionService {
    catalog: Catalog,
    dispatcher: AdapterDispatcher,
    inputs: InputResolver,
    prompts: PromptTemplateEngine,
}

impl StandardTaskExecutionService {
    pub fn new(catalog: Catalog, dispatcher: AdapterDispatcher, inputs: InputResolver) -> Self {
        Self {
            catalog,
            dispatcher,
            inputs,
            prompts: PromptTemplateEngine::new(),
        }
    }

    async fn run_task(&self, request: &ExecuteTaskRequest) -> Result<Completion, EngineError> {
        transition(ExecutionState::Validating);
        let task_uid = Uid::require(request.uid.as_ref(), "task UID")?;
        let override_uid = request.configuration_uid.as_ref().and_then(Uid::from_value);

        let task = self
            .catalog
            .tasks
            .find_by_uid(task_uid)
            .await?
            .ok_or_else(|| EngineError::not_found(EntityKind::Task, task_uid))?;
        if !task.is_active {
            return Err(EngineError::not_active(EntityKind::Task));
        }

        transition(ExecutionState::Resolving);
        let configuration = self
            .resolve_configuration(override_uid.or(task.configuration_uid))
            .await?;
        let (model, provider) = self.resolve_model_chain(&configuration).await?;
        debug!(
            task = %task.identifier,
            configuration = %configuration.identifier,
            model = %model.model_id,
            provider = %provider.identifier,
            "Resolved execution chain"
        );

        transition(ExecutionState::Building);
        let variables = self
            .inputs
            .resolve(task.input_type, &task.input_source, &request.input)
            .await?;
        let prompt = self.prompts.render(&task.prompt_template, &variables);
        let unresolved = self.prompts.unresolved(&task.prompt_template, &variables);
        if !unresolved.is_empty() {
            debug!(task_uid = task_uid.get(), placeholders = ?unresolved, "Prompt left placeholders unresolved");
        }

        transition(ExecutionState::Dispatching);
        self.dispatch(&provider, &model, &configuration, prompt).await
    }

    async fn run_configuration_test(
        &self,
        request: &TestConfigurationRequest,
    ) -> Result<Completion, EngineError> {
        transition(ExecutionState::Validating);
        let configuration_uid = Uid::require(request.uid.as_ref(), "configuration UID")?;

        transition(ExecutionState::Resolving);
        let configuration = self.resolve_configuration(Some(configuration_uid)).await?;
        let (model, provider) = self.resolve_model_chain(&configuration).await?;

        transition(ExecutionState::Building);
        let prompt = request
            .prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_TEST_PROMPT)
            .to_string();

        transition(ExecutionState::Dispatching);
        self.dispatch(&provider, &model, &configuration, prompt).await
    }

    /// Explicit uid, else the catalog default.
    async fn resolve_configuration(&self, uid: Option<Uid>) -> Result<Configuration, EngineError> {
        let configuration = match uid {
            Some(uid) => self
                .catalog
                .configurations
                .find_by_uid(uid)
                .await?
                .ok_or_else(|| EngineError::not_found(EntityKind::Configuration, uid))?,
            None => self.catalog.configurations.find_default().await?.ok_or_else(|| {
                EngineError::NotConfigured(
                    "No configuration specified and no default configuration set".to_string(),
                )
            })?,
        };

        if !configuration.is_active {
            return Err(EngineError::not_active(EntityKind::Configuration));
        }
        Ok(configuration)
    }

    /// Configuration -> Model -> Provider. Inactive models and providers are
    /// still used; only missing links stop the execution.
    async fn resolve_model_chain(
        &self,
        configuration: &Configuration,
    ) -> Result<(Model, Provider), EngineError> {
        let no_model = || EngineError::NotConfigured("Configuration has no model assigned".to_string());

        let model_uid = configuration.model_uid.ok_or_else(no_model)?;
        let model = self
            .catalog
            .models
            .find_by_uid(model_uid)
            .await?
            .ok_or_else(no_model)?;

        let provider = self
            .catalog
            .providers
            .find_by_uid(model.provider_uid)
            .await?
            .ok_or_else(|| EngineError::NotConfigured("Model has no provider".to_string()))?;

        if !model.is_active {
            warn!(model = %model.identifier, "Executing with an inactive model");
        }
        if !provider.is_active {
            warn!(provider = %provider.identifier, "Executing with an inactive provider");
        }
        Ok((model, provider))
    }

    async fn dispatch(
        &self,
        provider: &Provider,
        model: &Model,
        configuration: &Configuration,
        prompt: String,
    ) -> Result<Completion, EngineError> {
        let (adapter, connection) = self.dispatcher.connect(provider)?;

        let options = CompletionOptions {
            temperature: configuration.temperature,
            max_tokens: configuration.max_tokens_option(),
            system_prompt: configuration.system_prompt_option(),
            prompt,
        };

        let deadline = connection.timeout + TIMEOUT_GRACE;
        let mut completion =
            match tokio::time::timeout(deadline, adapter.complete(&connection, &model.model_id, &options)).await {
                Ok(result) => result?,
                Err(_) => return Err(LLMError::Timeout(connection.timeout).into()),
            };
        if completion.model_used.is_empty() {
            completion.model_used = model.model_id.clone();
        }
        Ok(completion)
    }

    fn normalize(
        kind: &'static str,
        started: Instant,
        result: Result<Completion, EngineError>,
    ) -> ExecutionResponse {
        transition(ExecutionState::Normalizing);
        let elapsed = started.elapsed().as_secs_f64();
        metrics::histogram!("switchboard_execution_duration_seconds", "kind" => kind).record(elapsed);

        match result {
            Ok(completion) => {
                metrics::counter!("switchboard_executions_total", "kind" => kind, "outcome" => "succeeded")
                    .increment(1);
                info!(
                    prompt_tokens = completion.usage.prompt_tokens,
                    completion_tokens = completion.usage.completion_tokens,
                    elapsed_seconds = elapsed,
                    "Execution succeeded"
                );

                ExecutionResponse::Success(ExecutionSuccess {
                    success: true,
                    content: completion.content,
                    model: completion.model_used,
                    usage: completion.usage,
                    execution_time: (elapsed * 1000.0).round() / 1000.0,
                })
            }
            Err(err) => {
                metrics::counter!("switchboard_executions_total", "kind" => kind, "outcome" => "failed")
                    .increment(1);
                match &err {
                    EngineError::Storage(detail) => {
                        warn!(kind = ?err.kind(), %detail, "Execution failed")
                    }
                    _ => warn!(kind = ?err.kind(), error = %err, "Execution failed"),
                }
                ExecutionResponse::failure(&err)
            }
        }
    }
}

#[async_trait]
impl TaskExecutionService for StandardTaskExecutionService {
    async fn execute_task(&self, request: ExecuteTaskRequest) -> ExecutionResponse {
        let execution_id = Uuid::new_v4();
        let span = tracing::info_span!("execution", %execution_id, kind = "task");

        async {
            let started = Instant::now();
            let result = self.run_task(&request).await;
            Self::normalize("task", started, result)
        }
        .instrument(span)
        .await
    }

    async fn test_configuration(&self, request: TestConfigurationRequest) -> ExecutionResponse {
        let execution_id = Uuid::new_v4();
        let span = tracing::info_span!("execution", %execution_id, kind = "configuration_test");

        async {
            let started = Instant::now();
            let result = self.run_configuration_test(&request).await;
            Self::normalize("configuration_test", started, result)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::{LLMAdapter, ModelLimits, ModelSummary, ProviderConnection};
    use crate::domain::task::Task;
    use crate::infrastructure::credentials::EnvCredentialStore;
    use crate::infrastructure::input_sources::{FileLogSource, InMemoryRecordSource};
    use crate::infrastructure::llm::AdapterRegistry;
    use crate::infrastructure::repositories::in_memory_catalog;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    /// Records the last prompt and echoes it back.
    #[derive(Default)]
    struct EchoAdapter {
        last: Mutex<Option<CompletionOptions>>,
    }

    #[async_trait]
    impl LLMAdapter for EchoAdapter {
        fn adapter_type(&self) -> &'static str {
            "echo"
        }

        fn default_endpoint(&self) -> &'static str {
            "http://echo.invalid"
        }

        async fn list_models(&self, _: &ProviderConnection) -> Result<Vec<ModelSummary>, LLMError> {
            Ok(vec![ModelSummary::new("echo-1")])
        }

        async fn detect_limits(&self, _: &ProviderConnection, _: &str) -> Result<ModelLimits, LLMError> {
            Ok(ModelLimits {
                context_length: 1000,
                max_output_tokens: 100,
            })
        }

        async fn complete(
            &self,
            _: &ProviderConnection,
            model_id: &str,
            options: &CompletionOptions,
        ) -> Result<Completion, LLMError> {
            *self.last.lock() = Some(options.clone());
            if options.prompt.contains("RATE") {
                return Err(LLMError::RateLimit);
            }
            Ok(Completion {
                content: format!("echo: {}", options.prompt),
                usage: TokenUsage {
                    prompt_tokens: 3,
                    completion_tokens: 4,
                },
                model_used: model_id.to_string(),
            })
        }
    }

    struct Fixture {
        service: StandardTaskExecutionService,
        catalog: Catalog,
        adapter: Arc<EchoAdapter>,
        configuration_uid: Uid,
        provider_uid: Uid,
    }

    async fn fixture() -> Fixture {
        let catalog = in_memory_catalog();
        let adapter = Arc::new(EchoAdapter::default());

        let mut registry = AdapterRegistry::new();
        registry.register("echo", adapter.clone());
        let dispatcher = AdapterDispatcher::new(Arc::new(registry), Arc::new(EnvCredentialStore::new()));

        let provider = catalog
            .providers
            .insert(Provider::new("echo", "Echo", "echo"))
            .await
            .unwrap();
        let provider_uid = provider.uid.unwrap();
        let model = catalog
            .models
            .insert(Model::new("echo-model", provider_uid, "echo-1"))
            .await
            .unwrap();

        let mut configuration = Configuration::new("default", "Default").with_model(model.uid.unwrap());
        configuration.system_prompt = "Sei gentile. 🙂".to_string();
        configuration.max_tokens = 0;
        let configuration = catalog.configurations.insert(configuration).await.unwrap();
        let configuration_uid = configuration.uid.unwrap();

        let mut tables = std::collections::HashMap::new();
        tables.insert("tickets".to_string(), vec![json!({"id": 1, "title": "Printer on fire"})]);
        let inputs = InputResolver::new(
            Arc::new(InMemoryRecordSource::new(tables)),
            Arc::new(FileLogSource::default()),
        );

        Fixture {
            service: StandardTaskExecutionService::new(catalog.clone(), dispatcher, inputs),
            catalog,
            adapter,
            configuration_uid,
            provider_uid,
        }
    }

    async fn add_task(fixture: &Fixture, task: Task) -> Uid {
        fixture.catalog.tasks.insert(task).await.unwrap().uid.unwrap()
    }

    fn execute(uid: Value) -> ExecuteTaskRequest {
        ExecuteTaskRequest {
            uid: Some(uid),
            ..Default::default()
        }
    }

    fn error_of(response: &ExecutionResponse) -> &ExecutionFailure {
        match response {
            ExecutionResponse::Failure(failure) => failure,
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_manual_task() {
        let fx = fixture().await;
        let task = Task::new("greet", "Greet", "Say hi to {{input}} {{unknown}}")
            .with_configuration(fx.configuration_uid);
        let uid = add_task(&fx, task).await;

        let mut request = execute(json!(uid.get()));
        request.input.input = Some("Ada".to_string());

        let response = fx.service.execute_task(request).await;
        match &response {
            ExecutionResponse::Success(success) => {
                assert!(success.success);
                assert_eq!(success.content, "echo: Say hi to Ada {{unknown}}");
                assert_eq!(success.model, "echo-1");
                assert_eq!(success.usage.total(), 7);
                assert!(success.execution_time >= 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }

        let sent = fx.adapter.last.lock().clone().unwrap();
        assert_eq!(sent.max_tokens, None);
        assert_eq!(sent.system_prompt.as_deref(), Some("Sei gentile. 🙂"));

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["success"], json!(true));
        assert!(body.get("executionTime").is_some());
        assert_eq!(body["usage"]["promptTokens"], json!(3));
    }

    #[tokio::test]
    async fn test_records_task() {
        let fx = fixture().await;
        let task = Task::new("triage", "Triage", "{{count}} from {{table}}:\n{{input}}")
            .with_configuration(fx.configuration_uid)
            .with_input(crate::domain::task::InputType::Records, json!({"table": "tickets"}));
        let uid = add_task(&fx, task).await;

        let response = fx.service.execute_task(execute(json!(uid.get().to_string()))).await;
        assert!(response.is_success());
        let sent = fx.adapter.last.lock().clone().unwrap();
        assert!(sent.prompt.starts_with("1 from tickets:\n["));
        assert!(sent.prompt.contains("Printer on fire"));
    }

    #[tokio::test]
    async fn test_malformed_identifiers() {
        let fx = fixture().await;
        for raw in [json!(0), json!(-3), json!(1.5), json!([1]), json!("abc"), json!(null)] {
            let response = fx.service.execute_task(execute(raw)).await;
            let failure = error_of(&response);
            assert_eq!(failure.kind, ErrorKind::MissingIdentifier);
            assert_eq!(failure.error, "No task UID specified");
            assert_eq!(response.status_code(), 400);
        }

        let response = fx.service.execute_task(ExecuteTaskRequest::default()).await;
        assert_eq!(error_of(&response).kind, ErrorKind::MissingIdentifier);

        let response = fx.service.execute_task(execute(json!(i64::MAX))).await;
        assert_eq!(error_of(&response).kind, ErrorKind::NotFound);
        assert_eq!(response.status_code(), 404);
    }

    #[tokio::test]
    async fn test_inactive_task() {
        let fx = fixture().await;
        let mut task = Task::new("off", "Off", "{{input}}");
        task.is_active = false;
        let uid = add_task(&fx, task).await;

        let response = fx.service.execute_task(execute(json!(uid.get()))).await;
        let failure = error_of(&response);
        assert_eq!(failure.kind, ErrorKind::NotConfigured);
        assert!(failure.error.contains("not active"));
    }

    #[tokio::test]
    async fn test_default_configuration_resolution() {
        let fx = fixture().await;
        let uid = add_task(&fx, Task::new("plain", "Plain", "{{input}}")).await;

        let response = fx.service.execute_task(execute(json!(uid.get()))).await;
        assert_eq!(
            error_of(&response).error,
            "No configuration specified and no default configuration set"
        );

        fx.catalog
            .configurations
            .set_default(fx.configuration_uid)
            .await
            .unwrap();
        let response = fx.service.execute_task(execute(json!(uid.get()))).await;
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_malformed_configuration_override_is_ignored() {
        let fx = fixture().await;
        let task = Task::new("t", "T", "{{input}}").with_configuration(fx.configuration_uid);
        let uid = add_task(&fx, task).await;

        let mut request = execute(json!(uid.get()));
        request.configuration_uid = Some(json!("not-a-number"));
        assert!(fx.service.execute_task(request).await.is_success());

        let mut request = execute(json!(uid.get()));
        request.configuration_uid = Some(json!(4242));
        let response = fx.service.execute_task(request).await;
        assert_eq!(error_of(&response).error, "Configuration with UID 4242 not found");
    }

    #[tokio::test]
    async fn test_configuration_without_model() {
        let fx = fixture().await;
        let bare = fx
            .catalog
            .configurations
            .insert(Configuration::new("bare", "Bare"))
            .await
            .unwrap();

        let response = fx
            .service
            .test_configuration(TestConfigurationRequest {
                uid: Some(json!(bare.uid.unwrap().get())),
                prompt: None,
            })
            .await;
        let failure = error_of(&response);
        assert_eq!(failure.kind, ErrorKind::NotConfigured);
        assert!(failure.error.contains("model"));
    }

    #[tokio::test]
    async fn test_configuration_test_with_inactive_provider() {
        let fx = fixture().await;
        fx.catalog.providers.toggle_active(fx.provider_uid).await.unwrap();

        let response = fx
            .service
            .test_configuration(TestConfigurationRequest {
                uid: Some(json!(fx.configuration_uid.get())),
                prompt: None,
            })
            .await;
        assert!(response.is_success());
        let sent = fx.adapter.last.lock().clone().unwrap();
        assert_eq!(sent.prompt, DEFAULT_TEST_PROMPT);
    }

    #[tokio::test]
    async fn test_dangling_provider() {
        let fx = fixture().await;
        fx.catalog.providers.soft_delete(fx.provider_uid).await.unwrap();

        let response = fx
            .service
            .test_configuration(TestConfigurationRequest {
                uid: Some(json!(fx.configuration_uid.get())),
                prompt: Some("hi".to_string()),
            })
            .await;
        assert_eq!(error_of(&response).error, "Model has no provider");
    }

    #[tokio::test]
    async fn test_provider_rejection_is_normalized() {
        let fx = fixture().await;
        let response = fx
            .service
            .test_configuration(TestConfigurationRequest {
                uid: Some(json!(fx.configuration_uid.get())),
                prompt: Some("RATE".to_string()),
            })
            .await;
        let failure = error_of(&response);
        assert_eq!(failure.kind, ErrorKind::ProviderRejected);
        assert!(failure.error.to_lowercase().contains("rate"));

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body, json!({"success": false, "error": failure.error}));
    }
}
