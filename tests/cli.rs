use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};

fn skillexec(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skillexec"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("binary should launch")
}

fn invoke(skill: &str, params: Value) -> (Value, i32) {
    let params = params.to_string();
    let output = skillexec(&["--skill", skill, "--params", &params]);
    parse(output)
}

fn parse(output: Output) -> (Value, i32) {
    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    assert_eq!(stdout.lines().count(), 1, "exactly one JSON line: {stdout:?}");
    let doc: Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
    (doc, output.status.code().expect("exit code"))
}

fn scratch() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("skillexec-cli-")
        .tempdir_in("/tmp")
        .expect("tempdir")
}

fn path_in(dir: &Path, name: &str) -> String {
    dir.join(name).display().to_string()
}

#[test]
fn bash_echo() {
    let (doc, code) = invoke("bash", json!({"command": "echo hi"}));
    assert_eq!(code, 0);
    assert_eq!(
        doc,
        json!({"stdout": "hi\n", "stderr": "", "exit_code": 0, "command": "echo hi"})
    );
}

#[test]
fn bash_exit_status_is_in_document_not_process() {
    let (doc, code) = invoke("bash", json!({"command": "exit 7"}));
    assert_eq!(code, 0);
    assert_eq!(doc["exit_code"], 7);
}

#[test]
fn bash_blocked_command() {
    let (doc, code) = invoke("bash", json!({"command": "rm -rf / --no-preserve-root"}));
    assert_eq!(code, 1);
    assert_eq!(doc, json!({"error": "Dangerous command blocked: rm -rf /"}));
}

#[test]
fn bash_timeout() {
    let (doc, code) = invoke("bash", json!({"command": "sleep 5", "timeout": 1}));
    assert_eq!(code, 1);
    assert_eq!(doc, json!({"error": "Command timeout after 1 seconds"}));
}

#[test]
fn bash_missing_command() {
    let (doc, code) = invoke("bash", json!({"timeout": 3}));
    assert_eq!(code, 1);
    assert_eq!(doc, json!({"error": "Command is required"}));
}

#[test]
fn editor_scenario_create_insert_view() {
    let dir = scratch();
    let path = path_in(dir.path(), "a.txt");

    let (doc, code) = invoke(
        "text_editor",
        json!({"command": "create", "path": path, "content": "one\ntwo"}),
    );
    assert_eq!(code, 0);
    assert_eq!(doc["status"], "created");
    assert_eq!(doc["lines_affected"], 2);

    let (doc, code) = invoke(
        "text_editor",
        json!({"command": "insert", "path": path, "line_number": 2, "content": "INSERTED"}),
    );
    assert_eq!(code, 0);
    assert_eq!(doc["status"], "inserted");

    let (doc, code) = invoke("text_editor", json!({"command": "view", "path": path}));
    assert_eq!(code, 0);
    assert_eq!(doc["content"], "one\nINSERTED\ntwo");
    assert_eq!(doc["lines_affected"], 3);
}

#[test]
fn editor_refuses_etc_passwd() {
    let (doc, code) = invoke(
        "text_editor",
        json!({"command": "view", "path": "/etc/passwd"}),
    );
    assert_eq!(code, 1);
    assert_eq!(doc, json!({"error": "File operations restricted to /tmp directory"}));
}

#[test]
fn editor_delete_then_view_not_found() {
    let dir = scratch();
    let path = path_in(dir.path(), "gone.txt");
    std::fs::write(&path, "x\n").unwrap();

    let (doc, code) = invoke("text_editor", json!({"command": "delete", "path": path}));
    assert_eq!(code, 0);
    assert_eq!(doc["status"], "deleted");
    assert_eq!(doc["lines_affected"], 0);

    let (doc, code) = invoke("text_editor", json!({"command": "view", "path": path}));
    assert_eq!(code, 1);
    assert_eq!(doc, json!({"error": format!("File not found: {path}")}));
}

#[test]
fn unknown_skill() {
    let (doc, code) = invoke("python", json!({}));
    assert_eq!(code, 1);
    assert_eq!(doc, json!({"error": "Unknown skill: python"}));
}

#[test]
fn invalid_json_params() {
    let (doc, code) = parse(skillexec(&["--skill", "bash", "--params", "{oops"]));
    assert_eq!(code, 1);
    assert!(doc["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON parameters: "));
}

#[test]
fn missing_argument_is_json_error_with_exit_one() {
    let (doc, code) = parse(skillexec(&["--skill", "bash"]));
    assert_eq!(code, 1);
    assert!(doc["error"].as_str().unwrap().contains("--params"));
}

#[test]
fn stderr_is_silent_by_default() {
    let output = skillexec(&["--skill", "bash", "--params", r#"{"command": "echo x 1>&2"}"#]);
    assert!(output.stderr.is_empty());
    let (doc, code) = parse(output);
    assert_eq!(code, 0);
    assert_eq!(doc["stderr"], "x\n");
}

#[test]
fn config_file_extends_denylist_and_moves_sandbox() {
    let dir = scratch();
    let config_path = path_in(dir.path(), "skillexec.toml");
    let root = dir.path().join("root");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(
        &config_path,
        format!(
            "[bash]\ndeny = [\"shutdown\"]\n\n[text_editor]\nsandbox_root = \"{}\"\n",
            root.display()
        ),
    )
    .unwrap();

    let params = json!({"command": "echo shutdown"}).to_string();
    let (doc, code) = parse(skillexec(&[
        "--skill", "bash", "--params", &params, "--config", &config_path,
    ]));
    assert_eq!(code, 1);
    assert_eq!(doc, json!({"error": "Dangerous command blocked: shutdown"}));

    // Sibling of the configured root, still under /tmp, is now outside.
    let outside = path_in(dir.path(), "outside.txt");
    let params = json!({"command": "create", "path": outside}).to_string();
    let (doc, code) = parse(skillexec(&[
        "--skill", "text_editor", "--params", &params, "--config", &config_path,
    ]));
    assert_eq!(code, 1);
    assert!(doc["error"]
        .as_str()
        .unwrap()
        .starts_with("File operations restricted to "));
}

#[test]
fn bad_config_file_is_json_error() {
    let params = json!({"command": "true"}).to_string();
    let (doc, code) = parse(skillexec(&[
        "--skill", "bash", "--params", &params, "--config", "/nonexistent/skillexec.toml",
    ]));
    assert_eq!(code, 1);
    assert!(doc["error"].as_str().unwrap().starts_with("cannot load config: "));
}
