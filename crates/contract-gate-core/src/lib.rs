// crates/contract-gate-core/src/lib.rs
// ============================================================================
// Module: Contract Gate Core Library
// Description: Public API surface for the Contract Gate core.
// Purpose: Expose document loading, linting, schema checks, and diffing.
// Dependencies: crate::{audit, diff, document, hashing, lint, report, schema}
// ============================================================================

//! ## Overview
//! Contract Gate core loads OpenAPI 3.0 documents, validates that the contract
//! itself is well formed, checks JSON payloads against the schemas it declares,
//! and classifies changes between two versions of the same contract.
//!
//! The crate performs no network I/O; live response checks live in
//! `contract-gate-probe` and reuse [`SchemaValidator`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod diff;
pub mod document;
pub mod hashing;
pub mod lint;
pub mod report;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::CheckAuditEvent;
pub use audit::CheckAuditEventParams;
pub use audit::CheckKind;
pub use audit::CheckOutcome;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use diff::BreakingChange;
pub use diff::BreakingChangeDetector;
pub use diff::ChangeCategory;
pub use diff::ChangeSummary;
pub use diff::Severity;
pub use diff::highest_severity;
pub use diff::summarize;
pub use document::DocumentError;
pub use document::DocumentFormat;
pub use document::HttpMethod;
pub use document::OpenApiDocument;
pub use document::UnresolvedRef;
pub use hashing::HashDigest;
pub use lint::LintFinding;
pub use lint::LintReport;
pub use lint::LintRule;
pub use lint::LintStats;
pub use lint::lint_document;
pub use report::ReportError;
pub use report::ReportFormat;
pub use report::canonical_json;
pub use report::render_diff;
pub use report::render_lint;
pub use report::render_violations;
pub use report::write_report;
pub use schema::SchemaError;
pub use schema::SchemaValidator;
pub use schema::SchemaViolation;
pub use schema::ValidationSummary;
