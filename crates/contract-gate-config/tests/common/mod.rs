// crates/contract-gate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for contract-gate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;

use contract_gate_config::ConfigError;
use contract_gate_config::ContractGateConfig;

/// Full configuration exercising every section.
pub const FULL_CONFIG: &str = r#"
[spec]
path = "contracts/users-api-v2.yaml"
baseline = "contracts/users-api-v1.yaml"

[probe]
base_url = "http://127.0.0.1:8080"
allow_http = true
timeout_ms = 2500
max_response_bytes = 65536
allowed_hosts = ["127.0.0.1", "API.example.com"]

[[probe.checks]]
method = "get"
path = "/users/{id}"
params = { id = "1" }
expected_status = 200

[[probe.checks]]
method = "post"
path = "/users"
body = { name = "Ada", email = "ada@example.com" }

[diff]
fail_on = "high"

[reports]
dir = "reports"
format = "markdown"

[audit]
enabled = true
path = "reports/audit.jsonl"
"#;

/// Parses a TOML string into a `ContractGateConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<ContractGateConfig, ConfigError> {
    ContractGateConfig::parse(toml_str)
}

/// Returns a config with all defaults applied.
pub fn minimal_config() -> Result<ContractGateConfig, ConfigError> {
    config_from_toml("")
}

/// Writes `content` to a config file inside `dir`.
pub fn write_config(dir: &tempfile::TempDir, content: &[u8]) -> Result<PathBuf, String> {
    let path = dir.path().join("contract-gate.toml");
    std::fs::write(&path, content).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Assert that a validation result is an error containing a specific substring.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
