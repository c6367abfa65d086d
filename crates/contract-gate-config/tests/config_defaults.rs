//! Config defaults and loading tests for contract-gate-config.
// crates/contract-gate-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Loading Tests
// Description: Validate defaults, full parsing, and file loading limits.
// Purpose: Ensure an empty config is valid and loading fails closed.
// =============================================================================

#![allow(clippy::use_debug, reason = "Debug output makes assertion failures readable.")]

use contract_gate_config::ContractGateConfig;
use contract_gate_core::HttpMethod;
use contract_gate_core::ReportFormat;
use contract_gate_core::Severity;
use contract_gate_probe::DEFAULT_USER_AGENT;

mod common;

type TestResult = Result<(), String>;

#[test]
fn default_config_validates() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config != ContractGateConfig::default() {
        return Err("empty toml should equal the default config".to_string());
    }
    if config.diff.fail_on != Severity::Medium {
        return Err("diff.fail_on should default to medium".to_string());
    }
    if config.reports.format != ReportFormat::Text || config.reports.dir.is_some() {
        return Err("reports should default to text on stdout".to_string());
    }
    if config.audit.enabled {
        return Err("audit should default to disabled".to_string());
    }
    Ok(())
}

#[test]
fn default_probe_config_is_https_only() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    let probe = config.probe.to_probe_config();
    if probe.allow_http || probe.timeout_ms != 5_000 || probe.max_response_bytes != 1024 * 1024 {
        return Err(format!("unexpected probe defaults: {probe:?}"));
    }
    if probe.user_agent != DEFAULT_USER_AGENT || probe.allowed_hosts.is_some() {
        return Err("probe user agent and hosts should use defaults".to_string());
    }
    Ok(())
}

#[test]
fn full_config_parses_every_section() -> TestResult {
    let config = common::config_from_toml(common::FULL_CONFIG).map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.spec.baseline.as_deref() != Some("contracts/users-api-v1.yaml") {
        return Err("spec.baseline not parsed".to_string());
    }
    if config.diff.fail_on != Severity::High || config.reports.format != ReportFormat::Markdown {
        return Err("diff or reports section not parsed".to_string());
    }
    let checks = &config.probe.checks;
    if checks.len() != 2 || checks[0].method != HttpMethod::Get || checks[1].method != HttpMethod::Post {
        return Err(format!("unexpected checks: {checks:?}"));
    }
    if checks[0].params.get("id").map(String::as_str) != Some("1")
        || checks[0].expected_status != Some(200)
    {
        return Err("first check params or status not parsed".to_string());
    }
    if checks[1].body.as_ref().and_then(|body| body.get("name")).is_none() {
        return Err("second check body not parsed".to_string());
    }
    Ok(())
}

#[test]
fn probe_config_normalizes_hosts() -> TestResult {
    let config = common::config_from_toml(common::FULL_CONFIG).map_err(|err| err.to_string())?;
    let probe = config.probe.to_probe_config();
    let hosts = probe.allowed_hosts.ok_or("allowed hosts missing")?;
    if !hosts.contains("api.example.com") || !hosts.contains("127.0.0.1") {
        return Err(format!("unexpected hosts: {hosts:?}"));
    }
    if !probe.allow_http || probe.timeout_ms != 2500 || probe.max_response_bytes != 65536 {
        return Err("probe settings not carried over".to_string());
    }
    Ok(())
}

#[test]
fn load_file_reads_and_validates() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = common::write_config(&dir, common::FULL_CONFIG.as_bytes())?;
    let config = ContractGateConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if !config.audit.enabled {
        return Err("audit.enabled not loaded".to_string());
    }
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    common::assert_invalid(ContractGateConfig::load(Some(&path)), "config io error")
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let mut content = b"# padding\n".to_vec();
    content.resize(1024 * 1024 + 1, b'#');
    let path = common::write_config(&dir, &content)?;
    common::assert_invalid(ContractGateConfig::load_file(&path), "exceeds size limit")
}

#[test]
fn non_utf8_file_is_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = common::write_config(&dir, &[0x5b, 0xff, 0xfe, 0x5d])?;
    common::assert_invalid(ContractGateConfig::load_file(&path), "must be utf-8")
}

#[test]
fn unknown_keys_are_parse_errors() -> TestResult {
    common::assert_invalid(
        common::config_from_toml("[reports]\nformats = \"json\"\n"),
        "config parse error",
    )?;
    common::assert_invalid(common::config_from_toml("[extra]\n"), "config parse error")
}

#[test]
fn misspelled_check_keys_are_parse_errors() -> TestResult {
    common::assert_invalid(
        common::config_from_toml(
            "[[probe.checks]]\nmethod = \"post\"\npath = \"/users\"\nstauts = 201\n",
        ),
        "config parse error",
    )
}

#[test]
fn invalid_enum_values_are_parse_errors() -> TestResult {
    common::assert_invalid(common::config_from_toml("[diff]\nfail_on = \"low\"\n"), "parse")?;
    common::assert_invalid(common::config_from_toml("[reports]\nformat = \"html\"\n"), "parse")
}
