//! Shared test utilities for integration tests
//!
//! Provides settings pointing at a mock server with pacing and backoff
//! tuned so tests run fast, plus mocks for the common login endpoints.

#![allow(dead_code)]

use twitter_flow_client::Settings;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings wired to the mock server, with full login credentials and
/// near-zero pacing delays
pub fn test_settings(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.api.base_url = server.uri();
    settings.api.bearer_token = "test_bearer".to_string();
    settings.credentials.username = Some("test_user".to_string());
    settings.credentials.password = Some("test_pass".to_string());
    settings.credentials.email = Some("test@example.com".to_string());
    settings.rate_limit.min_interval_ms = 0;
    settings.rate_limit.max_requests = 1_000;
    settings.retry.max_attempts = 3;
    settings.retry.base_delay_ms = 1;
    settings
}

/// Build a flow-task response body
pub fn flow_response(flow_token: &str, subtask_id: &str) -> serde_json::Value {
    serde_json::json!({
        "flow_token": flow_token,
        "status": "success",
        "subtasks": [{ "subtask_id": subtask_id }]
    })
}

/// Mount the guest activation endpoint
pub async fn mount_guest_activation(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/1.1/guest/activate.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "guest_token": "guest_test" }))
                .insert_header("set-cookie", "guest_id=v1%3Atest; Path=/"),
        )
        .mount(server)
        .await;
}

/// Mount a login flow whose first step already reports success
pub async fn mount_instant_login(server: &MockServer) {
    mount_guest_activation(server).await;
    Mock::given(method("POST"))
        .and(path("/1.1/onboarding/task.json"))
        .and(query_param("flow_name", "login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(flow_response("flow_done", "LoginSuccessSubtask"))
                .insert_header("set-cookie", "auth_token=session_auth; Path=/")
                .insert_header("set-cookie", "ct0=session_csrf; Path=/"),
        )
        .mount(server)
        .await;
}
