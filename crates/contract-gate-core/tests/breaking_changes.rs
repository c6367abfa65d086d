//! Breaking change integration tests for contract-gate-core.
// crates/contract-gate-core/tests/breaking_changes.rs
// =============================================================================
// Module: Breaking Change Tests
// Description: Compare the bundled Users API contract versions.
// Purpose: Ensure regressions between versions are detected and classified.
// =============================================================================

use std::collections::BTreeSet;

use contract_gate_core::BreakingChangeDetector;
use contract_gate_core::ChangeCategory;
use contract_gate_core::Severity;
use contract_gate_core::highest_severity;
use contract_gate_core::summarize;

mod common;

type TestResult = Result<(), String>;

fn fixture_detector() -> Result<BreakingChangeDetector, String> {
    BreakingChangeDetector::from_paths(
        &common::fixture_path("users-api-v1.yaml"),
        &common::fixture_path("users-api-v2.yaml"),
    )
    .map_err(|err| err.to_string())
}

#[test]
fn same_version_has_no_breaking_changes() -> TestResult {
    let path = common::fixture_path("users-api-v1.yaml");
    let detector = BreakingChangeDetector::from_paths(&path, &path).map_err(|err| err.to_string())?;
    let changes = detector.detect_all_changes();
    if !changes.is_empty() {
        return Err(format!("expected no changes, got {changes:?}"));
    }
    Ok(())
}

#[test]
fn v1_to_v2_covers_core_categories() -> TestResult {
    let changes = fixture_detector()?.detect_all_changes();
    let categories: BTreeSet<ChangeCategory> = changes.iter().map(|change| change.category).collect();
    for expected in [
        ChangeCategory::FieldRemoved,
        ChangeCategory::TypeChanged,
        ChangeCategory::EndpointRemoved,
        ChangeCategory::ResponseCodeChanged,
    ] {
        if !categories.contains(&expected) {
            return Err(format!("missing {expected} in {categories:?}"));
        }
    }
    Ok(())
}

#[test]
fn v1_to_v2_is_critical() -> TestResult {
    let changes = fixture_detector()?.detect_all_changes();
    let summary = summarize(&changes);
    if highest_severity(&changes) != Some(Severity::Critical) || summary.critical_count == 0 {
        return Err(format!("expected critical changes, got {summary:?}"));
    }
    Ok(())
}

#[test]
fn v2_to_v1_reports_reverted_additions() -> TestResult {
    let detector = BreakingChangeDetector::from_paths(
        &common::fixture_path("users-api-v2.yaml"),
        &common::fixture_path("users-api-v1.yaml"),
    )
    .map_err(|err| err.to_string())?;
    let changes = detector.detect_all_changes();
    let paths: Vec<&str> = changes.iter().map(|change| change.path.as_str()).collect();
    if !paths.contains(&"GET /users/{id}/posts") {
        return Err(format!("expected removed posts endpoint, got {paths:?}"));
    }
    if !paths.contains(&"schemas/Address.country") {
        return Err(format!("expected removed country field, got {paths:?}"));
    }
    Ok(())
}
