//! CLI integration tests
//!
//! Exercises the `twitter-post` binary end to end against a mock server,
//! configured entirely through environment variables.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn clean_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("twitter-post");
    for var in [
        "TWITTER_API_BASE_URL",
        "TWITTER_BEARER_TOKEN",
        "TWITTER_USERNAME",
        "TWITTER_PASSWORD",
        "TWITTER_EMAIL",
        "TWITTER_2FA_SECRET",
        "TWITTER_API_KEY",
        "TWITTER_API_SECRET",
        "TWITTER_ACCESS_TOKEN",
        "TWITTER_ACCESS_SECRET",
        "TWITTER_RATE_LIMIT_MAX",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/1.1/guest/activate.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "guest_token": "guest_cli" })),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1.1/onboarding/task.json"))
        .and(query_param("flow_name", "login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "flow_token": "t1",
            "status": "success",
            "subtasks": [{ "subtask_id": "LoginSuccessSubtask" }]
        })))
        .mount(server)
        .await;
}

fn configured_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = clean_cmd();
    cmd.env("TWITTER_API_BASE_URL", server.uri())
        .env("TWITTER_BEARER_TOKEN", "cli_bearer")
        .env("TWITTER_USERNAME", "cli_user")
        .env("TWITTER_PASSWORD", "cli_pass")
        .env("TWITTER_EMAIL", "cli@example.com")
        .arg("--no-session-store");
    cmd
}

#[test]
fn test_version_flag() {
    let mut cmd = clean_cmd();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_operations() {
    let mut cmd = clean_cmd();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("post"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_missing_subcommand_fails() {
    clean_cmd().assert().failure();
}

#[test]
fn test_missing_credentials_fail_cleanly() {
    let mut cmd = clean_cmd();
    cmd.arg("--no-session-store").args(["post", "hello"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing credentials"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_outputs_result_json() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": { "id": "777", "text": "from the cli" }
        })))
        .mount(&server)
        .await;

    let mut cmd = configured_cmd(&server);
    cmd.args(["post", "from the cli"]);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(json["Posted"]["id"], "777");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_log_level_is_honored() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let mut config = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut config, b"[logging]\nlevel = \"debug\"\n").unwrap();

    let mut cmd = configured_cmd(&server);
    cmd.arg("--config").arg(config.path()).arg("verify");

    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("DEBUG"), "expected debug logs, got: {stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_verify_reports_session_state() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "screen_name": "cli_user"
        })))
        .mount(&server)
        .await;

    let mut cmd = configured_cmd(&server);
    cmd.arg("verify");

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(json["logged_in"], true);
}
