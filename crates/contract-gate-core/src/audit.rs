// crates/contract-gate-core/src/audit.rs
// ============================================================================
// Module: Contract Check Audit Logging
// Description: Structured audit events for executed contract checks.
// Purpose: Emit one JSON line per check without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every check the CLI runs (lint, schema check, diff, probe) produces one
//! [`CheckAuditEvent`]. Sinks serialize events as JSON lines to stderr, an
//! append-only file, or nowhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::hashing::HashDigest;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Kind of check that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Structural lint of a contract.
    Lint,
    /// Payload validation against a schema.
    Schema,
    /// Breaking-change comparison of two contracts.
    Diff,
    /// Live response compliance probe.
    Probe,
}

/// Result of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The check ran and found nothing to report.
    Passed,
    /// The check ran and reported findings.
    Failed,
    /// The check could not run.
    Error,
}

/// Audit event payload for one executed check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Check kind.
    pub check: CheckKind,
    /// What was checked (document label, operation, or base URL).
    pub subject: String,
    /// Check outcome.
    pub outcome: CheckOutcome,
    /// Number of findings, violations, or changes.
    pub finding_count: usize,
    /// Digest of the checked document when one was loaded.
    pub document_hash: Option<HashDigest>,
}

/// Inputs required to construct a check audit event.
pub struct CheckAuditEventParams {
    /// Check kind.
    pub check: CheckKind,
    /// What was checked.
    pub subject: String,
    /// Check outcome.
    pub outcome: CheckOutcome,
    /// Number of findings, violations, or changes.
    pub finding_count: usize,
    /// Digest of the checked document when one was loaded.
    pub document_hash: Option<HashDigest>,
}

impl CheckAuditEvent {
    /// Creates a new audit event stamped with the current time.
    #[must_use]
    pub fn new(params: CheckAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "contract_check",
            timestamp_ms,
            check: params.check,
            subject: params.subject,
            outcome: params.outcome,
            finding_count: params.finding_count,
            document_hash: params.document_hash,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for check events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &CheckAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &CheckAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &CheckAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &CheckAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
