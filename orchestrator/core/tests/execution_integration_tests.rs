// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

use mockito::Matcher;
use serde_json::json;
use switchboard_core::application::execution::{
    ExecuteTaskRequest, ExecutionResponse, TaskExecutionService, TestConfigurationRequest,
};
use switchboard_core::application::input_resolution::TaskInput;
use switchboard_core::domain::config::SwitchboardConfig;
use switchboard_core::domain::error::ErrorKind;
use switchboard_core::domain::identifier::Uid;
use switchboard_core::runtime::SwitchboardRuntime;

fn manifest(endpoint: &str) -> String {
    format!(
        r#"
apiVersion: switchboard.dev/v1
kind: SwitchboardConfig
metadata:
  name: integration
spec:
  catalog:
    providers:
      - identifier: primary
        name: Primary
        type: openai
        endpoint: {endpoint}
        api_key: sk-integration
        priority: 10
    models:
      - identifier: gpt
        provider: primary
        model_id: gpt-4o-mini
    configurations:
      - identifier: terse
        name: Terse
        model: gpt
        temperature: 0.1
        max_tokens: 64
        system_prompt: Answer in one line.
        default: true
      - identifier: orphan
        name: Orphan
    tasks:
      - identifier: summarize
        name: Summarize
        prompt_template: "Summarize for {{{{audience}}}}: {{{{input}}}}"
      - identifier: triage
        name: Triage
        prompt_template: "Triage {{{{count}}}} tickets:\n{{{{input}}}}"
        input_type: records
        input_source:
          table: tickets
        configuration: terse
  records:
    tickets:
      - id: 1
        title: Login page returns 500
      - id: 2
        title: Typo on pricing page
"#
    )
}

async fn runtime(endpoint: &str) -> SwitchboardRuntime {
    let config = SwitchboardConfig::from_yaml_str(&manifest(endpoint)).unwrap();
    SwitchboardRuntime::from_config(config).await.unwrap()
}

async fn task_uid(runtime: &SwitchboardRuntime, identifier: &str) -> Uid {
    runtime
        .catalog
        .catalog()
        .tasks
        .find_by_identifier(identifier)
        .await
        .unwrap()
        .and_then(|task| task.uid)
        .unwrap()
}

fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 21, "completion_tokens": 5, "total_tokens": 26}
    })
    .to_string()
}

#[tokio::test]
async fn test_manual_task_uses_default_configuration() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-integration")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 64,
            "messages": [
                {"role": "system", "content": "Answer in one line."},
                {"role": "user", "content": "Summarize for {{audience}}: quarterly numbers are up"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("Numbers up."))
        .create_async()
        .await;

    let runtime = runtime(&server.url()).await;
    let uid = task_uid(&runtime, "summarize").await;

    let response = runtime
        .execution
        .execute_task(ExecuteTaskRequest {
            uid: Some(json!(uid.get().to_string())),
            configuration_uid: None,
            input: TaskInput {
                input: Some("quarterly numbers are up".to_string()),
                ..Default::default()
            },
        })
        .await;

    mock.assert_async().await;
    match response {
        ExecutionResponse::Success(success) => {
            assert_eq!(success.content, "Numbers up.");
            assert_eq!(success.model, "gpt-4o-mini-2024-07-18");
            assert_eq!(success.usage.prompt_tokens, 21);
            assert_eq!(success.usage.completion_tokens, 5);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn test_records_task_renders_rows() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("Triage 2 tickets".to_string()),
            Matcher::Regex("Login page returns 500".to_string()),
        ]))
        .with_status(200)
        .with_body(completion_body("1: urgent, 2: low"))
        .create_async()
        .await;

    let runtime = runtime(&server.url()).await;
    let uid = task_uid(&runtime, "triage").await;

    let response = runtime
        .execution
        .execute_task(ExecuteTaskRequest {
            uid: Some(json!(uid.get())),
            ..Default::default()
        })
        .await;

    mock.assert_async().await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_rate_limit_is_normalized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error": {"message": "Rate limit reached for requests"}}"#)
        .create_async()
        .await;

    let runtime = runtime(&server.url()).await;
    let configuration = runtime
        .catalog
        .catalog()
        .configurations
        .find_by_identifier("terse")
        .await
        .unwrap()
        .unwrap();

    let response = runtime
        .execution
        .test_configuration(TestConfigurationRequest {
            uid: configuration.uid.map(|uid| json!(uid.get())),
            prompt: Some("ping".to_string()),
        })
        .await;

    assert_eq!(response.status_code(), 500);
    match response {
        ExecutionResponse::Failure(failure) => {
            assert_eq!(failure.kind, ErrorKind::ProviderRejected);
            assert!(failure.error.to_lowercase().contains("rate"));
            assert!(!failure.error.contains("sk-integration"));
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_failure() {
    let runtime = runtime("http://127.0.0.1:1").await;
    let uid = task_uid(&runtime, "summarize").await;

    let response = runtime
        .execution
        .execute_task(ExecuteTaskRequest {
            uid: Some(json!(uid.get())),
            ..Default::default()
        })
        .await;

    match response {
        ExecutionResponse::Failure(failure) => assert_eq!(failure.kind, ErrorKind::Transport),
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn test_configuration_without_model() {
    let runtime = runtime("http://127.0.0.1:1").await;
    let orphan = runtime
        .catalog
        .catalog()
        .configurations
        .find_by_identifier("orphan")
        .await
        .unwrap()
        .unwrap();

    let response = runtime
        .execution
        .test_configuration(TestConfigurationRequest {
            uid: orphan.uid.map(|uid| json!(uid.get())),
            prompt: None,
        })
        .await;

    match response {
        ExecutionResponse::Failure(failure) => {
            assert_eq!(failure.kind, ErrorKind::NotConfigured);
            assert!(failure.error.contains("model"));
        }
        other => panic!("unexpected response: {:?}", other),
    }
}
