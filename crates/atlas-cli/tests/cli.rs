//! CLI integration tests against the file-backed Data API.

mod common;

use std::fs;

use serde_json::{Value, json};
use tempfile::TempDir;

use common::{cli, file_api_url, run_cli, run_cli_success};

fn setup() -> (TempDir, String) {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    let url = file_api_url(&data);
    (temp, url)
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    let stdout = run_cli_success(temp.path(), &["--help"]);
    for command in ["import", "serve", "invoke", "todos", "search", "data"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
}

#[test]
fn test_data_insert_then_find() {
    let (temp, url) = setup();

    let stdout = run_cli_success(
        temp.path(),
        &[
            "data",
            "--data-api",
            &url,
            "insert-one",
            "test.users",
            r#"{"name": "john_doe", "email": "john@example.com", "age": 30}"#,
        ],
    );
    let inserted: Value = serde_json::from_str(stdout.trim()).unwrap();
    let id = inserted["insertedId"].as_str().unwrap().to_string();

    let stdout = run_cli_success(
        temp.path(),
        &["data", "--data-api", &url, "find", "test.users"],
    );
    let found: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(found["documents"][0]["_id"], json!(id));
    assert_eq!(found["documents"][0]["age"], 30);

    let stdout = run_cli_success(
        temp.path(),
        &[
            "data",
            "--data-api",
            &url,
            "find",
            "test.users",
            "--one",
            "--filter",
            r#"{"name": "nobody"}"#,
        ],
    );
    let found: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(found, json!({"document": null}));
}

#[test]
fn test_import_csv() {
    let (temp, url) = setup();
    let csv = temp.path().join("places.csv");
    fs::write(
        &csv,
        "Place Name,details_embedding_0,details_embedding_1\nBali,0.9,0.1\nKyoto,0.1,0.9\n",
    )
    .unwrap();

    let stdout = run_cli_success(
        temp.path(),
        &["import", csv.to_str().unwrap(), "--data-api", &url],
    );
    let summary: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(summary, json!({"rows": 2}));

    let stdout = run_cli_success(
        temp.path(),
        &["data", "--data-api", &url, "find", "travel.asia"],
    );
    let found: Value = serde_json::from_str(stdout.trim()).unwrap();
    let docs = found["documents"].as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1]["index"], 2);
    assert_eq!(docs[1]["details_embedding"], json!([0.1, 0.9]));
}

#[test]
fn test_invoke_todos_events() {
    let (temp, url) = setup();
    let event = temp.path().join("create.json");
    fs::write(
        &event,
        json!({
            "httpMethod": "POST",
            "path": "/todos",
            "body": "{\"title\": \"Complete workshop\"}"
        })
        .to_string(),
    )
    .unwrap();

    let stdout = run_cli_success(
        temp.path(),
        &[
            "invoke",
            "todos",
            "--event",
            event.to_str().unwrap(),
            "--data-api",
            &url,
        ],
    );
    let response: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(response["statusCode"], 201);
    assert_eq!(response["headers"]["Content-Type"], "application/json");

    let invalid = temp.path().join("update.json");
    fs::write(
        &invalid,
        json!({
            "httpMethod": "PUT",
            "path": "/todos/123",
            "pathParameters": {"id": "123"},
            "body": "{}"
        })
        .to_string(),
    )
    .unwrap();

    let stdout = run_cli_success(
        temp.path(),
        &[
            "invoke",
            "todos",
            "--event",
            invalid.to_str().unwrap(),
            "--data-api",
            &url,
        ],
    );
    let response: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(response["statusCode"], 400);
    let body: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert_eq!(body, json!({"error": "No fields to update"}));
}

#[test]
fn test_invoke_reads_event_from_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let (temp, url) = setup();
    let mut child = cli(temp.path())
        .args(["invoke", "todos", "--data-api", &url])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{"httpMethod": "GET", "path": "/todos"}"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["body"], r#"{"todos":[]}"#);
}

#[test]
fn test_config_file_supplies_data_api() {
    let (temp, url) = setup();
    let config = temp.path().join("atlas.toml");
    fs::write(
        &config,
        format!("[data_api]\nurl = \"{}\"\n\n[todos]\ncollection = \"tasks\"\n", url),
    )
    .unwrap();

    run_cli_success(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "data",
            "insert-one",
            "todos.tasks",
            r#"{"title": "from config"}"#,
        ],
    );

    let data_dir = temp.path().join("data");
    assert!(data_dir.join("todos").join("tasks.json").exists());
}

#[test]
fn test_missing_data_api_url_fails() {
    let temp = TempDir::new().unwrap();
    let output = run_cli(temp.path(), &["data", "find", "test.users"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No Data API URL"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_namespace_is_rejected() {
    let (temp, url) = setup();
    let output = run_cli(
        temp.path(),
        &["data", "--data-api", &url, "find", "nodot"],
    );
    assert!(!output.status.success());
}
