// crates/contract-gate-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared fixture loaders for contract-gate-core integration tests.
// Purpose: Reduce duplication across integration suites.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;

use contract_gate_core::DocumentError;
use contract_gate_core::OpenApiDocument;

/// Returns the path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Loads the first version of the Users API contract.
pub fn users_v1() -> Result<OpenApiDocument, DocumentError> {
    OpenApiDocument::load(&fixture_path("users-api-v1.yaml"))
}

/// Loads the second version of the Users API contract.
pub fn users_v2() -> Result<OpenApiDocument, DocumentError> {
    OpenApiDocument::load(&fixture_path("users-api-v2.yaml"))
}
