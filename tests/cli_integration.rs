//! Integration tests for the cascade CLI
//!
//! These tests run the compiled binary against temporary manifest files to
//! verify end-to-end behavior of every subcommand.

use std::fs;
use std::path::PathBuf;

use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Get a command instance for the cascade binary
fn cascade_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("cascade"))
}

/// A single-tool manifest with one value-gated fan-out
const CHAT_MANIFEST: &str = r#"
pkg.tools.chat.chat:
  name: chat
  type: custom_llm
  inputs:
    connection:
      type: [string]
      enum: ["azure-open-ai-connection", "open-ai-connection"]
    deployment_name:
      type: [string]
      enabled_by: connection
      enabled_by_value: ["azure-open-ai-connection"]
    model:
      type: [string]
      default: gpt-4
      enabled_by: connection
      enabled_by_value: ["open-ai-connection"]
"#;

/// A tool whose gating reference declares a default
const SEARCH_MANIFEST: &str = r#"
pkg.tools.search:
  inputs:
    api:
      type: [string]
      default: bing
    bing_key:
      type: [string]
      enabled_by: api
      enabled_by_value: [bing]
"#;

/// A tool gated on the runtime type of a connection object
const TYPED_MANIFEST: &str = r#"
pkg.tools.typed.chat:
  inputs:
    connection:
      type: [AzureOpenAIConnection, OpenAIConnection]
    deployment_name:
      type: [string]
      enabled_by: connection
      enabled_by_type: [AzureOpenAIConnection]
"#;

/// Write a manifest file into the directory, returning its path
fn write_manifest(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn chat_manifest(dir: &TempDir) -> PathBuf {
    write_manifest(dir, "tools.yaml", CHAT_MANIFEST)
}

fn parse_stdout(output: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// Validate Command Tests
// =============================================================================

#[test]
fn test_validate_accepts_valid_manifest() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("validate")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "pkg.tools.chat.chat: ok (3 input(s))",
        ))
        .stdout(predicate::str::contains("1 tool(s) valid"));
}

#[test]
fn test_validate_rejects_unknown_reference() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &dir,
        "tools.yaml",
        r#"
pkg.tools.broken:
  inputs:
    deployment_name:
      type: [string]
      enabled_by: missing
"#,
    );

    cascade_cmd()
        .arg("validate")
        .arg(&manifest)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "is enabled by unknown input 'missing'",
        ))
        .stderr(predicate::str::contains("1 validation failure(s)"));
}

#[test]
fn test_validate_reports_parse_errors() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "tools.yaml", "not: [valid");

    cascade_cmd()
        .arg("validate")
        .arg(&manifest)
        .assert()
        .failure()
        .stdout(predicate::str::contains("parse error"));
}

#[test]
fn test_validate_scans_directories() {
    let dir = TempDir::new().unwrap();
    chat_manifest(&dir);
    write_manifest(
        &dir,
        "echo.yaml",
        r#"
pkg.tools.echo:
  inputs:
    text:
      type: [string]
"#,
    );

    cascade_cmd()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("echo.yaml"))
        .stdout(predicate::str::contains("tools.yaml"))
        .stdout(predicate::str::contains("2 tool(s) valid"));
}

#[test]
fn test_validate_empty_directory_fails() {
    let dir = TempDir::new().unwrap();

    cascade_cmd()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No manifest files found under"));
}

#[test]
fn test_validate_json_reports_each_tool() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    let output = cascade_cmd()
        .arg("validate")
        .arg(&manifest)
        .args(["--format", "json"])
        .assert()
        .success();

    let json = parse_stdout(&output);
    assert_eq!(json["valid"], Value::Bool(true));

    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);

    let tools = files[0]["tools"].as_array().unwrap();
    assert_eq!(tools[0]["id"], "pkg.tools.chat.chat");
    assert_eq!(tools[0]["valid"], Value::Bool(true));
}

#[test]
fn test_validate_json_carries_error_details() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &dir,
        "tools.yaml",
        r#"
pkg.tools.broken:
  inputs:
    a:
      enabled_by: a
"#,
    );

    let output = cascade_cmd()
        .arg("validate")
        .arg(&manifest)
        .args(["--format", "json"])
        .assert()
        .failure();

    let json = parse_stdout(&output);
    assert_eq!(json["valid"], Value::Bool(false));

    let tools = json["files"][0]["tools"].as_array().unwrap();
    assert_eq!(tools[0]["valid"], Value::Bool(false));
    assert!(tools[0]["error"]
        .as_str()
        .unwrap()
        .contains("cannot be enabled by itself"));
}

// =============================================================================
// Tools Command Tests
// =============================================================================

#[test]
fn test_tools_lists_declared_tools() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("tools")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tools (1):"))
        .stdout(predicate::str::contains("pkg.tools.chat.chat"))
        .stdout(predicate::str::contains("custom_llm"));
}

#[test]
fn test_tools_reports_empty_manifests() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "tools.yaml", "{}");

    cascade_cmd()
        .arg("tools")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("No tools found."));
}

#[test]
fn test_tools_json_format() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    let output = cascade_cmd()
        .arg("tools")
        .arg(&manifest)
        .args(["--format", "json"])
        .assert()
        .success();

    let json = parse_stdout(&output);
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "pkg.tools.chat.chat");
    assert_eq!(items[0]["type"], "custom_llm");
    assert_eq!(items[0]["inputs"], 3);
    assert!(items[0]["path"].as_str().unwrap().ends_with("tools.yaml"));
}

#[test]
fn test_tools_scans_directories() {
    let dir = TempDir::new().unwrap();
    chat_manifest(&dir);
    write_manifest(
        &dir,
        "echo.yaml",
        r#"
pkg.tools.echo:
  inputs:
    text:
      type: [string]
"#,
    );

    cascade_cmd()
        .arg("tools")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Tools (2):"))
        .stdout(predicate::str::contains("pkg.tools.echo"));
}

// =============================================================================
// Inputs Command Tests
// =============================================================================

#[test]
fn test_inputs_lists_declarations() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("inputs")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Inputs for chat (pkg.tools.chat.chat):",
        ))
        .stdout(predicate::str::contains("connection"))
        .stdout(predicate::str::contains("gpt-4"))
        .stdout(predicate::str::contains(
            "enabled by connection = \"azure-open-ai-connection\"",
        ));
}

#[test]
fn test_inputs_json_format() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    let output = cascade_cmd()
        .arg("inputs")
        .arg(&manifest)
        .args(["--format", "json"])
        .assert()
        .success();

    let json = parse_stdout(&output);
    assert_eq!(json["tool"], "pkg.tools.chat.chat");
    assert_eq!(json["inputs"]["deployment_name"]["enabled_by"], "connection");
    assert_eq!(json["inputs"]["model"]["default"], "gpt-4");
}

#[test]
fn test_inputs_requires_tool_for_multi_tool_manifests() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &dir,
        "tools.yaml",
        r#"
pkg.tools.a:
  inputs:
    x:
      type: [string]
pkg.tools.b:
  inputs:
    y:
      type: [string]
"#,
    );

    cascade_cmd()
        .arg("inputs")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --tool"));

    // Naming the tool resolves the ambiguity
    cascade_cmd()
        .arg("inputs")
        .arg(&manifest)
        .args(["--tool", "pkg.tools.b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pkg.tools.b"));
}

#[test]
fn test_inputs_unknown_tool_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("inputs")
        .arg(&manifest)
        .args(["--tool", "pkg.tools.absent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in manifest"));
}

#[test]
fn test_inputs_reports_empty_declarations() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "tools.yaml", "pkg.tools.noop:\n  name: noop\n");

    cascade_cmd()
        .arg("inputs")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Tool 'pkg.tools.noop' declares no inputs.",
        ));
}

// =============================================================================
// Resolve Command Tests
// =============================================================================

#[test]
fn test_resolve_unset_reference_disables_dependents() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] connection"))
        .stdout(predicate::str::contains("[ ] deployment_name"))
        .stdout(predicate::str::contains("[ ] model"));
}

#[test]
fn test_resolve_set_enables_matching_branch() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--set", "connection=azure-open-ai-connection"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] connection"))
        .stdout(predicate::str::contains("[x] deployment_name"))
        .stdout(predicate::str::contains("[ ] model"));
}

#[test]
fn test_resolve_json_covers_every_input() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    let output = cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--set", "connection=azure-open-ai-connection"])
        .args(["--format", "json"])
        .assert()
        .success();

    let json = parse_stdout(&output);
    assert_eq!(json["tool"], "pkg.tools.chat.chat");

    let enabled = json["enabled"].as_object().unwrap();
    assert_eq!(enabled.len(), 3);
    assert_eq!(enabled["connection"], Value::Bool(true));
    assert_eq!(enabled["deployment_name"], Value::Bool(true));
    assert_eq!(enabled["model"], Value::Bool(false));
}

#[test]
fn test_resolve_reads_state_files() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);
    let state = dir.path().join("state.yaml");
    fs::write(&state, "connection: open-ai-connection\n").unwrap();

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .arg("--state")
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ] deployment_name"))
        .stdout(predicate::str::contains("[x] model"));
}

#[test]
fn test_resolve_set_overrides_state() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);
    let state = dir.path().join("state.json");
    fs::write(&state, r#"{"connection": "azure-open-ai-connection"}"#).unwrap();

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .arg("--state")
        .arg(&state)
        .args(["--set", "connection=open-ai-connection"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ] deployment_name"))
        .stdout(predicate::str::contains("[x] model"));
}

#[test]
fn test_resolve_defaults_seed_unset_inputs() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "tools.yaml", SEARCH_MANIFEST);

    // Without --defaults the reference stays unset
    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ] bing_key"));

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .arg("--defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] bing_key"));
}

#[test]
fn test_resolve_set_beats_defaults() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "tools.yaml", SEARCH_MANIFEST);

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--set", "api=serp"])
        .arg("--defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ] bing_key"));
}

#[test]
fn test_resolve_prune_prints_payload() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--set", "connection=azure-open-ai-connection"])
        .args(["--set", "deployment_name=gpt-35-turbo"])
        .arg("--prune")
        .assert()
        .success()
        .stdout(predicate::str::contains("Payload:"))
        .stdout(predicate::str::contains("gpt-35-turbo"));
}

#[test]
fn test_resolve_prune_json_drops_disabled_values() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    let output = cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--set", "connection=azure-open-ai-connection"])
        .args(["--set", "deployment_name=gpt-35-turbo"])
        .args(["--set", "model=gpt-4o"])
        .arg("--prune")
        .args(["--format", "json"])
        .assert()
        .success();

    let json = parse_stdout(&output);
    let payload = json["payload"].as_object().unwrap();
    assert_eq!(payload["connection"], "azure-open-ai-connection");
    assert_eq!(payload["deployment_name"], "gpt-35-turbo");
    // "model" is set but disabled, so the payload drops it
    assert!(!payload.contains_key("model"));
}

#[test]
fn test_resolve_type_gated_connection_objects() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "tools.yaml", TYPED_MANIFEST);

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--set", r#"connection={"type": "AzureOpenAIConnection"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] deployment_name"));

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--set", r#"connection={"type": "OpenAIConnection"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ] deployment_name"));
}

#[test]
fn test_resolve_type_key_flag_overrides_tag_field() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, "tools.yaml", TYPED_MANIFEST);

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--type-key", "kind"])
        .args(["--set", r#"connection={"kind": "AzureOpenAIConnection"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] deployment_name"));
}

#[test]
fn test_resolve_invalid_assignment_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .args(["--set", "no-equals-sign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected NAME=VALUE"));
}

#[test]
fn test_resolve_missing_state_file_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("resolve")
        .arg(&manifest)
        .arg("--state")
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read state file"));
}

#[test]
fn test_resolve_missing_manifest_fails() {
    let dir = TempDir::new().unwrap();

    cascade_cmd()
        .arg("resolve")
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// =============================================================================
// Graph Command Tests
// =============================================================================

#[test]
fn test_graph_lists_gates_and_order() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("graph")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Gates for chat (pkg.tools.chat.chat):",
        ))
        .stdout(predicate::str::contains(
            "deployment_name: enabled by connection",
        ))
        .stdout(predicate::str::contains("Always enabled: connection"))
        .stdout(predicate::str::contains("Resolve order: connection"));
}

#[test]
fn test_graph_reports_ungated_tools() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &dir,
        "tools.yaml",
        r#"
pkg.tools.echo:
  inputs:
    text:
      type: [string]
"#,
    );

    cascade_cmd()
        .arg("graph")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"))
        .stdout(predicate::str::contains("Always enabled: text"));
}

#[test]
fn test_graph_json_format() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    let output = cascade_cmd()
        .arg("graph")
        .arg(&manifest)
        .args(["--format", "json"])
        .assert()
        .success();

    let json = parse_stdout(&output);
    assert_eq!(json["tool"], "pkg.tools.chat.chat");

    let edges = json["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    assert!(edges
        .iter()
        .any(|e| e["input"] == "deployment_name" && e["reference"] == "connection"));

    let order = json["order"].as_array().unwrap();
    assert_eq!(order.len(), 3);
    assert_eq!(order[0], "connection");
}

#[test]
fn test_graph_rejects_cyclic_manifests() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &dir,
        "tools.yaml",
        r#"
pkg.tools.cyclic:
  inputs:
    a:
      enabled_by: b
    b:
      enabled_by: a
"#,
    );

    cascade_cmd()
        .arg("graph")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
}

// =============================================================================
// Global Flag Tests
// =============================================================================

#[test]
fn test_verbose_writes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    cascade_cmd()
        .arg("--verbose")
        .arg("resolve")
        .arg(&manifest)
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose]"))
        .stderr(predicate::str::contains("[verbose:resolve]"));
}

#[test]
fn test_json_stdout_stays_clean_under_verbose() {
    let dir = TempDir::new().unwrap();
    let manifest = chat_manifest(&dir);

    let output = cascade_cmd()
        .arg("--verbose")
        .arg("resolve")
        .arg(&manifest)
        .args(["--format", "json"])
        .assert()
        .success();

    // Verbose lines go to stderr; stdout still parses as one JSON document
    let json = parse_stdout(&output);
    assert!(json["enabled"].is_object());
}

#[test]
fn test_help_shows_subcommands() {
    cascade_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("graph"));
}
