// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! HTTP API
//!
//! Thin axum adapter over the application services. Request bodies are read
//! leniently: an empty or non-object body is treated as "no parameters", and
//! each parameter is normalized on its own so one malformed value never hides
//! the others. Every response is JSON, failures included.
//!
//! # Architecture
//!
//! - **Layer:** Presentation Layer
//! - **Purpose:** Map routes to engine operations and errors to status codes

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::catalog::CatalogService;
use crate::application::diagnostics::ProviderDiagnostics;
use crate::application::execution::{
    ExecuteTaskRequest, ExecutionResponse, TaskExecutionService, TestConfigurationRequest,
};
use crate::application::input_resolution::TaskInput;
use crate::domain::error::EngineError;
use crate::domain::identifier::Uid;
use crate::domain::task::InputType;

pub struct AppState {
    pub execution: Arc<dyn TaskExecutionService>,
    pub catalog: Arc<CatalogService>,
    pub diagnostics: Arc<ProviderDiagnostics>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks/execute", post(execute_task))
        .route("/configurations/test", post(test_configuration))
        .route("/configurations/default", post(set_default_configuration))
        .route("/providers/test", post(test_provider))
        .route("/providers/models", post(discover_models))
        .route("/providers/toggle", post(toggle_provider))
        .route("/providers/primary", get(primary_provider))
        .route("/models/toggle", post(toggle_model))
        .route("/models/default", post(set_default_model))
        .route("/models/limits", post(detect_limits))
        .with_state(Arc::new(state))
}

/// Request parameters as a loose JSON object.
#[derive(Debug, Default)]
struct Params(Map<String, Value>);

impl Params {
    fn from_body(body: &Bytes) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Params(map),
            _ => Params::default(),
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// First present key wins.
    fn uid(&self, keys: &[&str], field: &'static str) -> Result<Uid, EngineError> {
        let raw = keys.iter().find_map(|key| self.get(key));
        Uid::require(raw, field)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    fn usize(&self, key: &str) -> Option<usize> {
        match self.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "yes"),
            Some(Value::Number(n)) => n.as_u64() == Some(1),
            _ => false,
        }
    }

    fn records(&self) -> Option<Vec<Value>> {
        self.get("records").and_then(|v| v.as_array()).cloned()
    }

    fn variables(&self) -> HashMap<String, String> {
        self.get("variables")
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| {
                        let value = match v {
                            Value::String(text) => text.clone(),
                            other => other.to_string(),
                        };
                        (k.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn task_input(&self) -> Result<TaskInput, EngineError> {
        let input_type = self
            .string("inputType")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<InputType>())
            .transpose()
            .map_err(EngineError::InvalidInput)?;

        Ok(TaskInput {
            input: self.string("input"),
            input_type,
            table: self.string("table"),
            records: self.records(),
            limit: self.usize("limit"),
            offset: self.usize("offset"),
            variables: self.variables(),
        })
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn failure(err: &EngineError) -> Response {
    let body = json!({ "success": false, "error": err.to_string() });
    (status(err.kind().status_code()), Json(body)).into_response()
}

fn respond<T: Serialize>(result: Result<T, EngineError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => failure(&err),
    }
}

fn execution(response: ExecutionResponse) -> Response {
    (status(response.status_code()), Json(response)).into_response()
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn execute_task(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let input = match params.task_input() {
        Ok(input) => input,
        Err(err) => return failure(&err),
    };

    let request = ExecuteTaskRequest {
        uid: params.get("uid").cloned(),
        configuration_uid: params.get("configurationUid").cloned(),
        input,
    };
    execution(state.execution.execute_task(request).await)
}

async fn test_configuration(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let request = TestConfigurationRequest {
        uid: params
            .get("uid")
            .or_else(|| params.get("configurationUid"))
            .cloned(),
        prompt: params.string("prompt"),
    };
    execution(state.execution.test_configuration(request).await)
}

async fn set_default_configuration(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let result = match params.uid(&["uid", "configurationUid"], "configuration UID") {
        Ok(uid) => state.catalog.set_default_configuration(uid).await,
        Err(err) => Err(err),
    };
    respond(result)
}

async fn test_provider(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let uid = match params.uid(&["providerUid", "uid"], "provider UID") {
        Ok(uid) => uid,
        Err(err) => return failure(&err),
    };
    let result = state.diagnostics.test_connection(uid).await.map(|result| {
        json!({
            "success": result.ok,
            "message": result.message,
            "models": result.models,
        })
    });
    respond(result)
}

async fn discover_models(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let uid = match params.uid(&["providerUid", "uid"], "provider UID") {
        Ok(uid) => uid,
        Err(err) => return failure(&err),
    };
    let result = state
        .diagnostics
        .discover_models(uid, params.bool("import"))
        .await
        .map(|discovery| {
            json!({
                "success": true,
                "models": discovery.models,
                "imported": discovery.imported,
            })
        });
    respond(result)
}

async fn toggle_provider(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let result = match params.uid(&["uid", "providerUid"], "provider UID") {
        Ok(uid) => state.catalog.toggle_provider(uid).await,
        Err(err) => Err(err),
    };
    respond(result)
}

async fn primary_provider(State(state): State<Arc<AppState>>) -> Response {
    let result = state
        .catalog
        .primary_provider()
        .await
        .map(|provider| json!({ "success": true, "provider": provider }));
    respond(result)
}

async fn toggle_model(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let result = match params.uid(&["uid", "modelUid"], "model UID") {
        Ok(uid) => state.catalog.toggle_model(uid).await,
        Err(err) => Err(err),
    };
    respond(result)
}

async fn set_default_model(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let result = match params.uid(&["uid", "modelUid"], "model UID") {
        Ok(uid) => state.catalog.set_default_model(uid).await,
        Err(err) => Err(err),
    };
    respond(result)
}

async fn detect_limits(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let params = Params::from_body(&body);
    let uid = match params.uid(&["modelUid", "uid"], "model UID") {
        Ok(uid) => uid,
        Err(err) => return failure(&err),
    };
    let result = state
        .diagnostics
        .detect_limits(uid, params.bool("persist"))
        .await
        .map(|limits| json!({ "success": true, "limits": limits }));
    respond(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatch::AdapterDispatcher;
    use crate::application::execution::StandardTaskExecutionService;
    use crate::application::input_resolution::InputResolver;
    use crate::domain::provider::Provider;
    use crate::infrastructure::credentials::EnvCredentialStore;
    use crate::infrastructure::input_sources::{FileLogSource, InMemoryRecordSource};
    use crate::infrastructure::llm::AdapterRegistry;
    use crate::infrastructure::repositories::in_memory_catalog;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state() -> AppState {
        let catalog = in_memory_catalog();
        let registry = Arc::new(AdapterRegistry::with_builtin_adapters());
        let dispatcher = AdapterDispatcher::new(registry.clone(), Arc::new(EnvCredentialStore::new()));
        let catalog_service = Arc::new(CatalogService::new(catalog.clone(), registry));
        let inputs = InputResolver::new(
            Arc::new(InMemoryRecordSource::default()),
            Arc::new(FileLogSource::default()),
        );

        AppState {
            execution: Arc::new(StandardTaskExecutionService::new(catalog, dispatcher.clone(), inputs)),
            diagnostics: Arc::new(ProviderDiagnostics::new(catalog_service.clone(), dispatcher)),
            catalog: catalog_service,
        }
    }

    async fn call(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(app(state()), "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_identifier_is_400() {
        for body in ["", "not json", "[]", r#"{"uid": -1}"#, r#"{"uid": [1]}"#] {
            let (status, json) = call(app(state()), "POST", "/tasks/execute", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json, json!({"success": false, "error": "No task UID specified"}));
        }
    }

    #[tokio::test]
    async fn test_unknown_task_is_404() {
        let (status, json) = call(app(state()), "POST", "/tasks/execute", r#"{"uid": "99"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Task with UID 99 not found");
    }

    #[tokio::test]
    async fn test_bad_input_type() {
        let (status, json) = call(
            app(state()),
            "POST",
            "/tasks/execute",
            r#"{"uid": 1, "inputType": "ftp"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_toggle_and_primary_provider() {
        let state = state();
        let a = state
            .catalog
            .create_provider(Provider::new("a", "A", "openai").with_priority(10))
            .await
            .unwrap();
        let b = state
            .catalog
            .create_provider(Provider::new("b", "B", "ollama").with_priority(100))
            .await
            .unwrap();
        let router = app(state);

        let (_, json) = call(router.clone(), "GET", "/providers/primary", "").await;
        assert_eq!(json["provider"]["identifier"], "b");
        assert!(json["provider"].get("apiKey").is_none());

        let body = json!({ "uid": b.uid.unwrap().get() }).to_string();
        let (status, json) = call(router.clone(), "POST", "/providers/toggle", &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"success": true, "isActive": false}));

        let (_, json) = call(router.clone(), "GET", "/providers/primary", "").await;
        assert_eq!(json["provider"]["uid"], json!(a.uid.unwrap().get()));

        let (status, json) = call(router, "POST", "/providers/toggle", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No provider UID specified");
    }

    #[tokio::test]
    async fn test_default_configuration_not_found() {
        let (status, json) = call(
            app(state()),
            "POST",
            "/configurations/default",
            &json!({ "uid": i64::MAX }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_params_are_lenient() {
        let params = Params::from_body(&Bytes::from_static(
            br#"{"limit": "5", "offset": -1, "import": "true", "variables": {"n": 3, "s": "x", "z": null}}"#,
        ));
        assert_eq!(params.usize("limit"), Some(5));
        assert_eq!(params.usize("offset"), None);
        assert!(params.bool("import"));
        let vars = params.variables();
        assert_eq!(vars["n"], "3");
        assert_eq!(vars["s"], "x");
        assert!(!vars.contains_key("z"));
    }
}
