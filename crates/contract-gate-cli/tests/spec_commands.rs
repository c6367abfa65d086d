//! Spec and schema command tests for contract-gate-cli.
// crates/contract-gate-cli/tests/spec_commands.rs
// ============================================================================
// Module: CLI Spec and Schema Command Tests
// Description: Integration tests for `spec validate`, `spec info`, and `schema check`.
// Purpose: Ensure exit codes and reports reflect contract and payload checks.
// Dependencies: contract-gate-cli binary
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;

use serde_json::Value;

mod common;

type TestResult = Result<(), String>;

// ============================================================================
// SECTION: spec validate
// ============================================================================

#[test]
fn spec_validate_accepts_valid_contract() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let output = common::run_in(dir.path(), &["spec", "validate", "--spec", &common::users_v1()])?;
    common::expect_exit(&output, 0)?;
    let stdout = common::stdout(&output);
    if !stdout.contains("OpenAPI 3.0.3 | Users API 1.0.0") || !stdout.contains("Result: valid") {
        return Err(format!("unexpected lint output: {stdout}"));
    }
    Ok(())
}

#[test]
fn spec_validate_fails_on_lint_findings() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let spec = dir.path().join("broken.json");
    fs::write(&spec, r#"{"openapi": "2.0", "info": {"version": "1"}, "paths": {}}"#)
        .map_err(|err| err.to_string())?;
    let output = common::run_in(
        dir.path(),
        &["spec", "validate", "--spec", &spec.to_string_lossy(), "--format", "json"],
    )?;
    common::expect_exit(&output, 1)?;
    let report: Value =
        serde_json::from_str(&common::stdout(&output)).map_err(|err| err.to_string())?;
    if report["valid"] != Value::Bool(false) {
        return Err(format!("expected invalid report: {report}"));
    }
    let rules: Vec<&str> = report["findings"]
        .as_array()
        .ok_or("findings missing")?
        .iter()
        .filter_map(|finding| finding["rule"].as_str())
        .collect();
    for rule in ["openapi_version", "info_title_missing", "paths_empty"] {
        if !rules.contains(&rule) {
            return Err(format!("missing rule {rule} in {rules:?}"));
        }
    }
    Ok(())
}

#[test]
fn missing_contract_is_an_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let output = common::run_in(dir.path(), &["spec", "validate", "--spec", "absent.yaml"])?;
    common::expect_exit(&output, 2)?;
    if !common::stderr(&output).contains("Failed to load contract absent.yaml") {
        return Err(common::stderr(&output));
    }
    Ok(())
}

#[test]
fn spec_path_falls_back_to_config() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let config = format!("[spec]\npath = {:?}\n", common::users_v2());
    fs::write(dir.path().join("contract-gate.toml"), config).map_err(|err| err.to_string())?;
    let output = common::run_in(dir.path(), &["spec", "validate"])?;
    common::expect_exit(&output, 0)?;
    if !common::stdout(&output).contains("Users API 2.0.0") {
        return Err(common::stdout(&output));
    }
    Ok(())
}

#[test]
fn spec_without_path_or_config_is_an_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let output = common::run_in(dir.path(), &["spec", "validate"])?;
    common::expect_exit(&output, 2)?;
    if !common::stderr(&output).contains("pass --spec or set spec.path") {
        return Err(common::stderr(&output));
    }
    Ok(())
}

// ============================================================================
// SECTION: spec info
// ============================================================================

#[test]
fn spec_info_lists_operations_and_schemas() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let output = common::run_in(
        dir.path(),
        &["spec", "info", "--spec", &common::users_v1(), "--format", "json"],
    )?;
    common::expect_exit(&output, 0)?;
    let info: Value =
        serde_json::from_str(&common::stdout(&output)).map_err(|err| err.to_string())?;
    let operations = info["operations"].as_array().ok_or("operations missing")?;
    if !operations.contains(&Value::from("DELETE /users/{id}")) || operations.len() != 4 {
        return Err(format!("unexpected operations: {operations:?}"));
    }
    if !info["schemas"].as_array().ok_or("schemas missing")?.contains(&Value::from("User")) {
        return Err(format!("User schema missing: {info}"));
    }
    let digest = info["document_hash"].as_str().ok_or("document_hash missing")?;
    if !digest.starts_with("sha256:") {
        return Err(format!("digest missing: {info}"));
    }

    let text = common::run_in(dir.path(), &["spec", "info", "--spec", &common::users_v1()])?;
    common::expect_exit(&text, 0)?;
    if !common::stdout(&text).contains(digest) {
        return Err(format!("text digest differs from json: {}", common::stdout(&text)));
    }
    Ok(())
}

// ============================================================================
// SECTION: schema check
// ============================================================================

#[test]
fn schema_check_passes_conforming_instance() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let instance = dir.path().join("user.json");
    fs::write(
        &instance,
        r#"{"id": 1, "name": "Leanne Graham", "username": "Bret", "email": "leanne@example.com"}"#,
    )
    .map_err(|err| err.to_string())?;
    let output = common::run_in(
        dir.path(),
        &[
            "schema",
            "check",
            "--spec",
            &common::users_v1(),
            "--schema",
            "User",
            "--instance",
            &instance.to_string_lossy(),
        ],
    )?;
    common::expect_exit(&output, 0)?;
    if !common::stdout(&output).contains("Result: valid") {
        return Err(common::stdout(&output));
    }
    Ok(())
}

#[test]
fn schema_check_by_operation_reports_violations() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let instance = dir.path().join("user.json");
    fs::write(&instance, r#"{"id": "1", "name": "Leanne Graham", "username": "Bret"}"#)
        .map_err(|err| err.to_string())?;
    let output = common::run_in(
        dir.path(),
        &[
            "schema",
            "check",
            "--spec",
            &common::users_v1(),
            "--operation",
            "GET /users/{id}",
            "--instance",
            &instance.to_string_lossy(),
            "--format",
            "json",
        ],
    )?;
    common::expect_exit(&output, 1)?;
    let report: Value =
        serde_json::from_str(&common::stdout(&output)).map_err(|err| err.to_string())?;
    if report["subject"] != Value::from("GET /users/{id} 200") {
        return Err(format!("unexpected subject: {report}"));
    }
    let paths: Vec<&str> = report["violations"]
        .as_array()
        .ok_or("violations missing")?
        .iter()
        .filter_map(|violation| violation["path"].as_str())
        .collect();
    if !paths.contains(&"id") || !paths.contains(&"root") {
        return Err(format!("expected id and root violations, got {paths:?}"));
    }
    Ok(())
}

#[test]
fn schema_check_rejects_unknown_schema_and_bad_json() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let instance = dir.path().join("user.json");
    fs::write(&instance, "{not json").map_err(|err| err.to_string())?;
    let spec = common::users_v1();
    let instance_arg = instance.to_string_lossy().into_owned();

    let output = common::run_in(
        dir.path(),
        &["schema", "check", "--spec", &spec, "--schema", "User", "--instance", &instance_arg],
    )?;
    common::expect_exit(&output, 2)?;
    if !common::stderr(&output).contains("Failed to parse JSON") {
        return Err(common::stderr(&output));
    }

    fs::write(&instance, "{}").map_err(|err| err.to_string())?;
    let output = common::run_in(
        dir.path(),
        &["schema", "check", "--spec", &spec, "--schema", "Nope", "--instance", &instance_arg],
    )?;
    common::expect_exit(&output, 2)?;
    if !common::stderr(&output).contains("schema 'Nope' not found") {
        return Err(common::stderr(&output));
    }
    Ok(())
}

#[test]
fn schema_check_requires_schema_or_operation() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let output = common::run_in(
        dir.path(),
        &["schema", "check", "--spec", &common::users_v1(), "--instance", "x.json"],
    )?;
    common::expect_exit(&output, 2)
}
