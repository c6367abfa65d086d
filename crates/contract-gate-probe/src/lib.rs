// crates/contract-gate-probe/src/lib.rs
// ============================================================================
// Module: Contract Gate Probe
// Description: Live response compliance checks against a running API.
// Purpose: Prove an implementation returns what its contract promises.
// Dependencies: contract-gate-core, reqwest, serde
// ============================================================================

//! ## Overview
//! A [`ComplianceProbe`] sends one bounded HTTP request per [`ProbeCheck`],
//! compares the status code with the contract, and validates the JSON body
//! against the declared response schema. Requests follow the same fail-closed
//! policy throughout: HTTPS unless cleartext is explicitly allowed, optional
//! host allowlists, no redirects, and a response size limit.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod probe;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use probe::ComplianceProbe;
pub use probe::DEFAULT_USER_AGENT;
pub use probe::ProbeCheck;
pub use probe::ProbeConfig;
pub use probe::ProbeError;
pub use probe::ProbeOutcome;
pub use probe::ProbeReport;
pub use report::render_probe;
