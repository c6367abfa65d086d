// crates/contract-gate-cli/tests/common/mod.rs
// =============================================================================
// Module: CLI Test Helpers
// Description: Shared helpers for running the contract-gate binary.
// Purpose: Reduce duplication across CLI integration tests.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

/// Returns the path to the compiled `contract-gate` binary.
pub fn contract_gate_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_contract-gate"))
}

/// Returns a fixture path from the core crate's test fixtures.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../contract-gate-core/tests/fixtures").join(name)
}

/// Returns the v1 users contract.
pub fn users_v1() -> String {
    fixture("users-api-v1.yaml").to_string_lossy().into_owned()
}

/// Returns the v2 users contract.
pub fn users_v2() -> String {
    fixture("users-api-v2.yaml").to_string_lossy().into_owned()
}

/// Runs the binary in `cwd` with `args` and no config override from the environment.
pub fn run_in(cwd: &Path, args: &[&str]) -> Result<Output, String> {
    Command::new(contract_gate_bin())
        .current_dir(cwd)
        .env_remove("CONTRACT_GATE_CONFIG")
        .args(args)
        .output()
        .map_err(|err| format!("failed to run contract-gate: {err}"))
}

/// Returns the exit code, treating signals as an error.
pub fn exit_code(output: &Output) -> Result<i32, String> {
    output.status.code().ok_or_else(|| "process terminated by signal".to_string())
}

/// Returns stdout as text.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Returns stderr as text.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Fails with both streams when `actual` differs from `expected`.
pub fn expect_exit(output: &Output, expected: i32) -> Result<(), String> {
    let actual = exit_code(output)?;
    if actual == expected {
        Ok(())
    } else {
        Err(format!(
            "expected exit {expected}, got {actual}\nstdout:\n{}\nstderr:\n{}",
            stdout(output),
            stderr(output)
        ))
    }
}
