//! CLI Integration Tests
//!
//! These tests run the `pm25` binary. Commands that talk to a server are
//! pointed at a local mockito server, so no real server is needed.
//!
//! ```
//! cargo test --package pm25-cli --test cli_integration
//! ```

use std::path::Path;
use std::process::{Command, Output};

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Run pm25 with a private config location and no inherited overrides.
fn run_pm25(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pm25"))
        .args(args)
        .env("PM25_CONFIG", config_dir.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("PM25_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pm25 binary")
}

fn mock_json(server: &mut ServerGuard, method: &str, path: &str, body: Value) -> Mock {
    server
        .mock(method, path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create()
}

/// A server with every dashboard endpoint answering.
fn dashboard_server() -> (ServerGuard, Vec<Mock>) {
    let mut server = Server::new();
    let mocks = vec![
        mock_json(
            &mut server,
            "GET",
            "/api/current",
            json!({
                "datetime": "2025-11-23 14:00",
                "current_pm25": 40.0,
                "next_hour_prediction": 38.5,
                "status": "Unhealthy for Sensitive Groups"
            }),
        ),
        mock_json(
            &mut server,
            "GET",
            "/api/predictions",
            json!({"predictions": [
                {"target_datetime": "2025-11-23 15:00", "predicted_pm25": 38.5},
                {"target_datetime": "2025-11-23 16:00", "predicted_pm25": 36.5}
            ]}),
        ),
        mock_json(
            &mut server,
            "GET",
            "/api/history",
            json!({"history": [
                {"datetime": "2025-11-23 12:00", "pm25": 35.0, "sitename": "Tucheng"},
                {"datetime": "2025-11-23 13:00", "pm25": 38.0, "sitename": "Tucheng"},
                {"datetime": "2025-11-23 14:00", "pm25": 40.0, "sitename": "Tucheng"}
            ]}),
        ),
        mock_json(
            &mut server,
            "GET",
            "/api/status",
            json!({"status": "Sensitive groups should limit outdoor activity."}),
        ),
    ];
    (server, mocks)
}

// =============================================================================
// Help and Version Tests (no server required)
// =============================================================================

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_pm25(dir.path(), &["--help"]);

    assert!(output.status.success(), "Help should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["watch", "status", "history", "forecast", "stats", "chat", "config"] {
        assert!(stdout.contains(cmd), "Help should list {} command", cmd);
    }
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_pm25(dir.path(), &["--version"]);

    assert!(output.status.success(), "Version should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("pm25"));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let output = run_pm25(dir.path(), &["completions", "bash"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("pm25"));
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_config_path_honors_override() {
    let dir = TempDir::new().unwrap();
    let output = run_pm25(dir.path(), &["config", "path"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        dir.path().join("config.toml").display().to_string()
    );
}

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();

    let output = run_pm25(dir.path(), &["config", "init"]);
    assert!(output.status.success());
    assert!(dir.path().join("config.toml").exists());

    // A second init refuses to overwrite
    let output = run_pm25(dir.path(), &["config", "init"]);
    assert!(!output.status.success());

    let output = run_pm25(dir.path(), &["config", "show", "--url", "http://other:5000"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("server_url = \"http://other:5000\""));
    assert!(stdout.contains("history_hours = 168"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[dashboard]\nrefresh_interval = 1\n",
    )
    .unwrap();

    let output = run_pm25(dir.path(), &["status"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dashboard.refresh_interval"));
}

// =============================================================================
// Server commands against a mock server
// =============================================================================

#[test]
fn test_status_json() {
    let dir = TempDir::new().unwrap();
    let (server, _mocks) = dashboard_server();

    let output = run_pm25(
        dir.path(),
        &["status", "--json", "--url", &server.url(), "--stride", "1"],
    );

    assert!(
        output.status.success(),
        "status failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["phase"], "Live");
    assert_eq!(body["category"], "UnhealthyForSensitiveGroups");
    assert_eq!(body["last_updated"], "2025-11-23 14:00");
    assert_eq!(body["average_24h"], 37.5);
    assert_eq!(body["history"].as_array().unwrap().len(), 3);
    assert_eq!(body["trend"]["direction"], "Down");
}

#[test]
fn test_status_text() {
    let dir = TempDir::new().unwrap();
    let (server, _mocks) = dashboard_server();

    let output = run_pm25(dir.path(), &["status", "--url", &server.url()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Unhealthy for Sensitive Groups"));
    assert!(stdout.contains("Sensitive groups should limit outdoor activity."));
}

#[test]
fn test_status_partial_failure_still_renders() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    let _current = mock_json(
        &mut server,
        "GET",
        "/api/current",
        json!({"datetime": "2025-11-23 14:00", "current_pm25": 12.0}),
    );
    let _predictions = server
        .mock("GET", "/api/predictions")
        .with_status(404)
        .with_body(json!({"error": "No predictions available"}).to_string())
        .create();

    let output = run_pm25(dir.path(), &["status", "--url", &server.url()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Good"));
    assert!(stdout.contains("predictions unavailable"));
}

#[test]
fn test_status_unreachable_server_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_pm25(
        dir.path(),
        &["status", "--url", "http://127.0.0.1:9", "--timeout", "2"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No data from"));
}

#[test]
fn test_forecast_csv() {
    let dir = TempDir::new().unwrap();
    let (server, _mocks) = dashboard_server();

    let output = run_pm25(
        dir.path(),
        &["forecast", "--format", "csv", "--url", &server.url()],
    );

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "datetime,pm25,sitename\n2025-11-23 15:00,38.5,\n2025-11-23 16:00,36.5,\n"
    );
}

#[test]
fn test_history_to_file() {
    let dir = TempDir::new().unwrap();
    let (server, _mocks) = dashboard_server();
    let out_path = dir.path().join("history.json");

    let output = run_pm25(
        dir.path(),
        &[
            "history",
            "--format",
            "json",
            "--stride",
            "2",
            "--url",
            &server.url(),
            "--output",
            out_path.to_str().unwrap(),
        ],
    );

    assert!(output.status.success());
    let body: Value = serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["label"], "11/23 12:00");
    assert_eq!(rows[1]["pm25"], 40.0);
}

#[test]
fn test_stats_json() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    let _stats = mock_json(
        &mut server,
        "GET",
        "/api/stats",
        json!({
            "total_measurements": 720,
            "latest_datetime": "2025-11-23 14:00",
            "prediction_count": 24
        }),
    );

    let output = run_pm25(dir.path(), &["stats", "--json", "--url", &server.url()]);

    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["total_measurements"], 720);
}

#[test]
fn test_chat_one_shot() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    let chat = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::Json(json!({"message": "Average last week?"})))
        .with_status(200)
        .with_body(json!({"response": "It averaged 14.2 µg/m³."}).to_string())
        .create();

    let output = run_pm25(
        dir.path(),
        &["chat", "--message", "Average last week?", "--url", &server.url()],
    );

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Assistant: It averaged 14.2 µg/m³.\n"
    );
    chat.assert();
}

#[test]
fn test_chat_error_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    let _chat = server
        .mock("POST", "/api/chat")
        .with_status(500)
        .with_body(json!({"error": "quota exceeded"}).to_string())
        .create();

    let output = run_pm25(
        dir.path(),
        &["chat", "--message", "hello", "--url", &server.url()],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Sorry"));
}
