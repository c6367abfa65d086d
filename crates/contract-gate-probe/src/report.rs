// crates/contract-gate-probe/src/report.rs
// ============================================================================
// Module: Probe Reports
// Description: Text, JSON, and Markdown renderings of probe runs.
// Purpose: Share the core report formats for live compliance results.
// Dependencies: contract-gate-core
// ============================================================================

//! ## Overview
//! Renders a [`ProbeReport`] in the shared report formats. Text lists one
//! verdict line per check, Markdown a table, and JSON the report itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use contract_gate_core::ReportError;
use contract_gate_core::ReportFormat;
use contract_gate_core::canonical_json;
use contract_gate_core::report::escape_cell;

use crate::probe::ProbeOutcome;
use crate::probe::ProbeReport;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a probe report.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] when JSON serialization fails.
pub fn render_probe(report: &ProbeReport, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Json => canonical_json(report),
        ReportFormat::Text => {
            let mut out = String::new();
            writeln!(out, "Probe: {}", report.base_url)?;
            writeln!(out, "Result: {} passed, {} failed", report.passed, report.failed)?;
            for outcome in &report.outcomes {
                let verdict = if outcome.passed { "PASS" } else { "FAIL" };
                writeln!(out, "  {verdict} {} [{}]", outcome.label(), status_cell(outcome))?;
                if let Some(error) = &outcome.error {
                    writeln!(out, "      error: {error}")?;
                }
                for violation in &outcome.violations {
                    writeln!(out, "      - {violation}")?;
                }
            }
            Ok(out)
        }
        ReportFormat::Markdown => {
            let mut out = String::new();
            writeln!(out, "# Compliance Probe: {}\n", report.base_url)?;
            writeln!(out, "**{} passed**, **{} failed**.\n", report.passed, report.failed)?;
            out.push_str("| Result | Operation | Status | Details |\n| --- | --- | --- | --- |\n");
            for outcome in &report.outcomes {
                let details = outcome.error.as_ref().map_or_else(
                    || outcome.violations.join("; "),
                    |error| format!("error: {error}"),
                );
                writeln!(
                    out,
                    "| {} | `{}` | {} | {} |",
                    if outcome.passed { "pass" } else { "fail" },
                    outcome.label(),
                    status_cell(outcome),
                    escape_cell(&details)
                )?;
            }
            Ok(out)
        }
    }
}

/// Renders `received / expected` status, e.g. `404 / 200`.
fn status_cell(outcome: &ProbeOutcome) -> String {
    let received = outcome.status.map_or_else(|| "-".to_string(), |status| status.to_string());
    let expected = outcome.expected_status.as_deref().unwrap_or("-");
    format!("{received} / {expected}")
}
