//! Limits validation tests for contract-gate-config.
// crates/contract-gate-config/tests/limits_validation.rs
// =============================================================================
// Module: Limits Validation Tests
// Description: Boundary tests for probe limits, URLs, checks, and paths.
// Purpose: Ensure all numeric and policy limits are properly enforced.
// =============================================================================

use contract_gate_core::HttpMethod;
use contract_gate_probe::ProbeCheck;

mod common;

type TestResult = Result<(), String>;

// Test constants (from config.rs)
const MIN_PROBE_TIMEOUT_MS: u64 = 100;
const MAX_PROBE_TIMEOUT_MS: u64 = 60_000;
const MAX_PROBE_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
const MAX_ALLOWED_HOSTS: usize = 64;

// ============================================================================
// SECTION: Probe Limits
// ============================================================================

#[test]
fn timeout_bounds_are_inclusive() -> TestResult {
    for timeout in [MIN_PROBE_TIMEOUT_MS, MAX_PROBE_TIMEOUT_MS] {
        let mut config = common::minimal_config().map_err(|err| err.to_string())?;
        config.probe.timeout_ms = timeout;
        config.validate().map_err(|err| err.to_string())?;
    }
    for timeout in [MIN_PROBE_TIMEOUT_MS - 1, MAX_PROBE_TIMEOUT_MS + 1] {
        let mut config = common::minimal_config().map_err(|err| err.to_string())?;
        config.probe.timeout_ms = timeout;
        common::assert_invalid(config.validate(), "probe.timeout_ms")?;
    }
    Ok(())
}

#[test]
fn response_limit_bounds() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.probe.max_response_bytes = MAX_PROBE_RESPONSE_BYTES;
    config.validate().map_err(|err| err.to_string())?;
    config.probe.max_response_bytes = MAX_PROBE_RESPONSE_BYTES + 1;
    common::assert_invalid(config.validate(), "probe.max_response_bytes")?;
    config.probe.max_response_bytes = 0;
    common::assert_invalid(config.validate(), "probe.max_response_bytes")
}

#[test]
fn allowed_hosts_limits() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.probe.allowed_hosts = Some(Vec::new());
    common::assert_invalid(config.validate(), "must be non-empty when set")?;
    config.probe.allowed_hosts = Some(vec![" ".to_string()]);
    common::assert_invalid(config.validate(), "entries must be non-empty")?;
    config.probe.allowed_hosts =
        Some((0 ..= MAX_ALLOWED_HOSTS).map(|i| format!("host{i}.example.com")).collect());
    common::assert_invalid(config.validate(), "too many probe.allowed_hosts")?;
    config.probe.allowed_hosts =
        Some((0 .. MAX_ALLOWED_HOSTS).map(|i| format!("host{i}.example.com")).collect());
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn user_agent_must_be_non_empty() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.probe.user_agent = Some(String::new());
    common::assert_invalid(config.validate(), "probe.user_agent")?;
    config.probe.user_agent = Some("ci-probe/2".to_string());
    config.validate().map_err(|err| err.to_string())?;
    if config.probe.to_probe_config().user_agent != "ci-probe/2" {
        return Err("user agent override not applied".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Base URL Policy
// ============================================================================

#[test]
fn cleartext_base_url_requires_opt_in() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.probe.base_url = Some("http://127.0.0.1:8080".to_string());
    common::assert_invalid(config.validate(), "without probe.allow_http")?;
    config.probe.allow_http = true;
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn base_url_must_be_http_with_host() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.probe.base_url = Some("ftp://files.example.com".to_string());
    common::assert_invalid(config.validate(), "scheme ftp is not supported")?;
    config.probe.base_url = Some("not a url".to_string());
    common::assert_invalid(config.validate(), "probe.base_url is invalid")?;
    config.probe.base_url = Some("https://api.example.com/v1".to_string());
    config.validate().map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Checks
// ============================================================================

#[test]
fn check_paths_must_be_absolute() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.probe.checks.push(ProbeCheck::new(HttpMethod::Get, "/users"));
    config.probe.checks.push(ProbeCheck::new(HttpMethod::Get, "users"));
    common::assert_invalid(config.validate(), "probe.checks[1].path must start with /")
}

#[test]
fn expected_status_bounds() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.probe.checks.push(ProbeCheck::new(HttpMethod::Get, "/users").expect_status(599));
    config.validate().map_err(|err| err.to_string())?;
    config.probe.checks[0].expected_status = Some(99);
    common::assert_invalid(config.validate(), "probe.checks[0].expected_status")?;
    config.probe.checks[0].expected_status = Some(600);
    common::assert_invalid(config.validate(), "probe.checks[0].expected_status")
}

// ============================================================================
// SECTION: Paths
// ============================================================================

#[test]
fn section_paths_must_be_non_empty() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.spec.path = Some(" ".to_string());
    common::assert_invalid(config.validate(), "spec.path must be non-empty")?;
    config.spec.path = None;
    config.reports.dir = Some(String::new());
    common::assert_invalid(config.validate(), "reports.dir must be non-empty")?;
    config.reports.dir = None;
    config.audit.path = Some("a/".to_string() + &"b".repeat(256));
    common::assert_invalid(config.validate(), "audit.path path component too long")
}
