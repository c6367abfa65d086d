// crates/contract-gate-core/src/report.rs
// ============================================================================
// Module: Check Reports
// Description: Text, JSON, and Markdown renderings of check results.
// Purpose: Produce stable artifacts for terminals, pipelines, and reviews.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! Renderers turn lint reports, schema violations, and breaking changes into
//! one of three [`ReportFormat`]s. JSON output is canonical (RFC 8785) so
//! reports for the same inputs are byte-identical. [`write_report`] persists
//! a rendered body under a report directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::diff::BreakingChange;
use crate::diff::summarize;
use crate::document::OpenApiDocument;
use crate::lint::LintReport;
use crate::schema::SchemaViolation;

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Plain text for terminals.
    #[default]
    Text,
    /// Canonical JSON.
    Json,
    /// Markdown for review comments.
    Markdown,
}

impl ReportFormat {
    /// Returns the lowercase label for the format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }

    /// Returns the file extension used by [`write_report`].
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while rendering or writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(String),
    /// The report could not be written.
    #[error("failed to write report {path}: {error}")]
    Io {
        /// Destination path.
        path: String,
        /// Underlying I/O error message.
        error: String,
    },
    /// The report stem is empty or contains path separators.
    #[error("invalid report name '{0}'")]
    InvalidName(String),
    /// A text or Markdown body could not be formatted.
    #[error("failed to format report")]
    Format(#[from] fmt::Error),
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Serializes a value as canonical JSON.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] when serialization fails.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ReportError> {
    serde_jcs::to_string(value).map_err(|err| ReportError::Serialize(err.to_string()))
}

/// Renders a lint report.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] when JSON serialization fails.
pub fn render_lint(
    document: &OpenApiDocument,
    report: &LintReport,
    format: ReportFormat,
) -> Result<String, ReportError> {
    let label = document.label();
    let version = document.openapi_version().unwrap_or("?");
    let title = document.title().unwrap_or("?");
    let api_version = document.version().unwrap_or("?");
    match format {
        ReportFormat::Json => canonical_json(&json!({
            "document": label,
            "document_hash": document.digest(),
            "openapi": document.openapi_version(),
            "title": document.title(),
            "version": document.version(),
            "valid": report.is_valid(),
            "stats": report.stats,
            "findings": report.findings,
        })),
        ReportFormat::Text => {
            let mut out = String::new();
            writeln!(out, "Spec: {label}")?;
            writeln!(out, "OpenAPI {version} | {title} {api_version}")?;
            writeln!(
                out,
                "Paths: {}  Operations: {}  Schemas: {}",
                report.stats.paths, report.stats.operations, report.stats.schemas
            )?;
            if report.is_valid() {
                out.push_str("Result: valid\n");
            } else {
                writeln!(out, "Result: {} finding(s)", report.findings.len())?;
                for finding in &report.findings {
                    writeln!(
                        out,
                        "  - [{}] {}: {}",
                        finding.rule, finding.location, finding.message
                    )?;
                }
            }
            Ok(out)
        }
        ReportFormat::Markdown => {
            let mut out = String::new();
            writeln!(out, "# Contract Lint: {title} {api_version}\n")?;
            writeln!(out, "- Source: `{label}`")?;
            writeln!(out, "- OpenAPI: `{version}`")?;
            writeln!(out, "- Digest: `{}`", document.digest())?;
            writeln!(
                out,
                "- Paths: {} / Operations: {} / Schemas: {}\n",
                report.stats.paths, report.stats.operations, report.stats.schemas
            )?;
            if report.is_valid() {
                out.push_str("All lint rules passed.\n");
            } else {
                out.push_str("| Rule | Location | Message |\n| --- | --- | --- |\n");
                for finding in &report.findings {
                    writeln!(
                        out,
                        "| `{}` | `{}` | {} |",
                        finding.rule,
                        finding.location,
                        escape_cell(&finding.message)
                    )?;
                }
            }
            Ok(out)
        }
    }
}

/// Renders schema violations for one payload.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] when JSON serialization fails.
pub fn render_violations(
    subject: &str,
    violations: &[SchemaViolation],
    format: ReportFormat,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Json => canonical_json(&json!({
            "subject": subject,
            "valid": violations.is_empty(),
            "error_count": violations.len(),
            "violations": violations,
        })),
        ReportFormat::Text => {
            let mut out = String::new();
            writeln!(out, "Schema: {subject}")?;
            if violations.is_empty() {
                out.push_str("Result: valid\n");
            } else {
                writeln!(out, "Result: {} violation(s)", violations.len())?;
                for violation in violations {
                    writeln!(out, "  - {violation}")?;
                }
            }
            Ok(out)
        }
        ReportFormat::Markdown => {
            let mut out = String::new();
            writeln!(out, "# Schema Compliance: {subject}\n")?;
            if violations.is_empty() {
                out.push_str("Payload conforms to the schema.\n");
            } else {
                out.push_str("| Path | Message |\n| --- | --- |\n");
                for violation in violations {
                    writeln!(
                        out,
                        "| `{}` | {} |",
                        violation.path,
                        escape_cell(&violation.message)
                    )?;
                }
            }
            Ok(out)
        }
    }
}

/// Renders the breaking changes between two documents.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] when JSON serialization fails.
pub fn render_diff(
    old: &OpenApiDocument,
    new: &OpenApiDocument,
    changes: &[BreakingChange],
    format: ReportFormat,
) -> Result<String, ReportError> {
    let summary = summarize(changes);
    match format {
        ReportFormat::Json => canonical_json(&json!({
            "old": {"document": old.label(), "version": old.version(), "hash": old.digest()},
            "new": {"document": new.label(), "version": new.version(), "hash": new.digest()},
            "summary": summary,
            "changes": changes,
        })),
        ReportFormat::Text => {
            let mut out = String::new();
            writeln!(
                out,
                "Compare: {} ({}) -> {} ({})",
                old.label(),
                old.version().unwrap_or("?"),
                new.label(),
                new.version().unwrap_or("?")
            )?;
            if changes.is_empty() {
                out.push_str("Result: no breaking changes\n");
                return Ok(out);
            }
            writeln!(
                out,
                "Result: {} breaking change(s), {} critical",
                summary.total, summary.critical_count
            )?;
            for change in changes {
                writeln!(out, "  - {change}")?;
                writeln!(out, "      {}", change.description)?;
                writeln!(out, "      impact: {}", change.impact)?;
            }
            Ok(out)
        }
        ReportFormat::Markdown => {
            let mut out = String::new();
            writeln!(
                out,
                "# Breaking Changes: {} -> {}\n",
                old.version().unwrap_or("?"),
                new.version().unwrap_or("?")
            )?;
            if changes.is_empty() {
                out.push_str("No breaking changes detected.\n");
                return Ok(out);
            }
            writeln!(
                out,
                "**{} change(s)**, {} critical.\n",
                summary.total, summary.critical_count
            )?;
            out.push_str("| Severity | Category | Path | Description | Impact |\n");
            out.push_str("| --- | --- | --- | --- | --- |\n");
            for change in changes {
                writeln!(
                    out,
                    "| {} | `{}` | `{}` | {} | {} |",
                    change.severity,
                    change.category,
                    change.path,
                    escape_cell(&change.description),
                    escape_cell(&change.impact)
                )?;
            }
            Ok(out)
        }
    }
}

/// Escapes characters that would break a Markdown table cell.
#[must_use]
pub fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

/// Writes `body` to `<dir>/<stem>.<extension>`, creating `dir` if needed.
///
/// # Errors
///
/// Returns [`ReportError`] when the stem is invalid or the write fails.
pub fn write_report(
    dir: &Path,
    stem: &str,
    format: ReportFormat,
    body: &str,
) -> Result<PathBuf, ReportError> {
    if stem.is_empty() || stem.contains(['/', '\\']) || stem == "." || stem == ".." {
        return Err(ReportError::InvalidName(stem.to_string()));
    }
    let io_error = |path: &Path, err: std::io::Error| ReportError::Io {
        path: path.display().to_string(),
        error: err.to_string(),
    };
    fs::create_dir_all(dir).map_err(|err| io_error(dir, err))?;
    let path = dir.join(format!("{stem}.{}", format.extension()));
    fs::write(&path, body).map_err(|err| io_error(&path, err))?;
    Ok(path)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
