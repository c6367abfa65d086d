// crates/contract-gate-core/src/lint.rs
// ============================================================================
// Module: OpenAPI Contract Lint
// Description: Structural checks on an OpenAPI 3.0 document.
// Purpose: Prove the contract itself is sound before testing implementations.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`lint_document`] walks a loaded [`OpenApiDocument`] and records one
//! [`LintFinding`] per problem. Lint never stops at the first problem, so a
//! single run reports everything that needs fixing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::document::HttpMethod;
use crate::document::OpenApiDocument;
use crate::document::escape_pointer_token;

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Lint rules applied to every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintRule {
    /// `openapi` is missing or not a 3.0.x version string.
    OpenapiVersion,
    /// `info` is missing.
    InfoMissing,
    /// `info.title` is missing.
    InfoTitleMissing,
    /// `info.version` is missing.
    InfoVersionMissing,
    /// `paths` is missing.
    PathsMissing,
    /// `paths` has no entries.
    PathsEmpty,
    /// A path key does not start with `/`.
    InvalidPathKey,
    /// A path item declares no HTTP operation.
    PathWithoutOperations,
    /// An operation declares no responses.
    OperationWithoutResponses,
    /// A response key is not `default`, a status code, or a range.
    InvalidResponseCode,
    /// A component schema has neither `type` nor `$ref`.
    SchemaMissingType,
    /// An object schema declares no `properties`.
    ObjectWithoutProperties,
    /// A `$ref` does not resolve inside the document.
    UnresolvedRef,
}

impl LintRule {
    /// Returns the stable rule code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::OpenapiVersion => "openapi_version",
            Self::InfoMissing => "info_missing",
            Self::InfoTitleMissing => "info_title_missing",
            Self::InfoVersionMissing => "info_version_missing",
            Self::PathsMissing => "paths_missing",
            Self::PathsEmpty => "paths_empty",
            Self::InvalidPathKey => "invalid_path_key",
            Self::PathWithoutOperations => "path_without_operations",
            Self::OperationWithoutResponses => "operation_without_responses",
            Self::InvalidResponseCode => "invalid_response_code",
            Self::SchemaMissingType => "schema_missing_type",
            Self::ObjectWithoutProperties => "object_without_properties",
            Self::UnresolvedRef => "unresolved_ref",
        }
    }
}

impl fmt::Display for LintRule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// A single lint problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    /// Rule that fired.
    pub rule: LintRule,
    /// Where the problem is (JSON pointer, path template, or operation label).
    pub location: String,
    /// Human-readable description.
    pub message: String,
}

/// Counts of what the document declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LintStats {
    /// Number of path items.
    pub paths: usize,
    /// Number of operations across all path items.
    pub operations: usize,
    /// Number of component schemas.
    pub schemas: usize,
}

/// Result of linting a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintReport {
    /// Every finding, in rule order.
    pub findings: Vec<LintFinding>,
    /// Declared element counts.
    pub stats: LintStats,
}

impl LintReport {
    /// Returns true when no rule fired.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    /// Returns the findings raised by one rule.
    #[must_use]
    pub fn by_rule(&self, rule: LintRule) -> Vec<&LintFinding> {
        self.findings.iter().filter(|finding| finding.rule == rule).collect()
    }
}

// ============================================================================
// SECTION: Lint
// ============================================================================

/// Runs every lint rule against a document.
#[must_use]
pub fn lint_document(document: &OpenApiDocument) -> LintReport {
    let mut findings = Vec::new();
    let root = document.root();

    lint_version(root, &mut findings);
    lint_info(root, &mut findings);
    lint_paths(root, &mut findings);
    lint_schemas(document, &mut findings);
    for unresolved in document.unresolved_refs() {
        findings.push(LintFinding {
            rule: LintRule::UnresolvedRef,
            location: unresolved.location,
            message: format!("reference '{}' does not resolve", unresolved.reference),
        });
    }

    let stats = LintStats {
        paths: document.paths().map_or(0, serde_json::Map::len),
        operations: document.operations().len(),
        schemas: document.schemas().map_or(0, serde_json::Map::len),
    };
    LintReport {
        findings,
        stats,
    }
}

/// Checks the `openapi` version field.
fn lint_version(root: &Value, findings: &mut Vec<LintFinding>) {
    match root.get("openapi") {
        None => findings.push(LintFinding {
            rule: LintRule::OpenapiVersion,
            location: "/openapi".to_string(),
            message: "missing 'openapi' field".to_string(),
        }),
        Some(Value::String(version)) if version.starts_with("3.0.") => {}
        Some(other) => findings.push(LintFinding {
            rule: LintRule::OpenapiVersion,
            location: "/openapi".to_string(),
            message: format!("expected OpenAPI 3.0.x, got {other}"),
        }),
    }
}

/// Checks the `info` block.
fn lint_info(root: &Value, findings: &mut Vec<LintFinding>) {
    let Some(info) = root.get("info") else {
        findings.push(LintFinding {
            rule: LintRule::InfoMissing,
            location: "/info".to_string(),
            message: "missing 'info' field".to_string(),
        });
        return;
    };
    if info.get("title").is_none() {
        findings.push(LintFinding {
            rule: LintRule::InfoTitleMissing,
            location: "/info/title".to_string(),
            message: "missing 'info.title'".to_string(),
        });
    }
    if info.get("version").is_none() {
        findings.push(LintFinding {
            rule: LintRule::InfoVersionMissing,
            location: "/info/version".to_string(),
            message: "missing 'info.version'".to_string(),
        });
    }
}

/// Checks path keys, path items, operations, and response codes.
fn lint_paths(root: &Value, findings: &mut Vec<LintFinding>) {
    let Some(paths) = root.get("paths") else {
        findings.push(LintFinding {
            rule: LintRule::PathsMissing,
            location: "/paths".to_string(),
            message: "missing 'paths' field".to_string(),
        });
        return;
    };
    let Some(paths) = paths.as_object().filter(|paths| !paths.is_empty()) else {
        findings.push(LintFinding {
            rule: LintRule::PathsEmpty,
            location: "/paths".to_string(),
            message: "no paths defined".to_string(),
        });
        return;
    };

    for (path, item) in paths {
        if !path.starts_with('/') {
            findings.push(LintFinding {
                rule: LintRule::InvalidPathKey,
                location: path.clone(),
                message: format!("path '{path}' must start with '/'"),
            });
        }
        let methods: Vec<HttpMethod> = HttpMethod::ALL
            .into_iter()
            .filter(|method| item.get(method.as_str()).is_some())
            .collect();
        if methods.is_empty() {
            findings.push(LintFinding {
                rule: LintRule::PathWithoutOperations,
                location: path.clone(),
                message: format!("path '{path}' defines no operations"),
            });
        }
        for method in methods {
            let label = format!("{method} {path}");
            match item.get(method.as_str()).and_then(|operation| operation.get("responses")) {
                None => findings.push(LintFinding {
                    rule: LintRule::OperationWithoutResponses,
                    location: label,
                    message: "operation defines no responses".to_string(),
                }),
                Some(responses) => lint_responses(responses, &label, findings),
            }
        }
    }
}

/// Checks the `responses` map of one operation.
fn lint_responses(responses: &Value, label: &str, findings: &mut Vec<LintFinding>) {
    let Some(responses) = responses.as_object().filter(|responses| !responses.is_empty()) else {
        findings.push(LintFinding {
            rule: LintRule::OperationWithoutResponses,
            location: format!("{label} (empty)"),
            message: "operation defines no responses".to_string(),
        });
        return;
    };
    for code in responses.keys() {
        if !is_valid_response_code(code) {
            findings.push(LintFinding {
                rule: LintRule::InvalidResponseCode,
                location: format!("{label} {code}"),
                message: format!("response key '{code}' is not a status code, range, or 'default'"),
            });
        }
    }
}

/// Checks top-level component schemas.
fn lint_schemas(document: &OpenApiDocument, findings: &mut Vec<LintFinding>) {
    let Some(schemas) = document.schemas() else {
        return;
    };
    for (name, schema) in schemas {
        let location = format!("/components/schemas/{}", escape_pointer_token(name));
        if schema.get("type").is_none() && schema.get("$ref").is_none() {
            findings.push(LintFinding {
                rule: LintRule::SchemaMissingType,
                location: location.clone(),
                message: format!("{name}: missing 'type' field"),
            });
        }
        if schema.get("type").and_then(Value::as_str) == Some("object")
            && schema.get("properties").is_none()
        {
            findings.push(LintFinding {
                rule: LintRule::ObjectWithoutProperties,
                location,
                message: format!("{name}: object without 'properties'"),
            });
        }
    }
}

/// Accepts `default`, a three-digit code from 100 to 599, or a range like `2XX`.
fn is_valid_response_code(code: &str) -> bool {
    if code == "default" {
        return true;
    }
    let bytes = code.as_bytes();
    if bytes.len() != 3 || !(b'1' ..= b'5').contains(&bytes[0]) {
        return false;
    }
    let rest = &bytes[1 ..];
    rest.iter().all(u8::is_ascii_digit) || rest.iter().all(|byte| byte.eq_ignore_ascii_case(&b'x'))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
