// crates/contract-gate-core/src/diff.rs
// ============================================================================
// Module: Breaking Change Detection
// Description: Classify changes between two versions of a contract.
// Purpose: Flag edits that would break existing API consumers.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`BreakingChangeDetector`] compares an old and a new [`OpenApiDocument`]
//! and emits one [`BreakingChange`] per consumer-visible regression.
//! Detection runs in a fixed order (schemas, responses, required fields,
//! types, enums) and iterates maps in key order, so output is deterministic
//! for a given pair of documents.
//!
//! Additive changes (new paths, new optional fields, new schemas) are not
//! reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::document::DocumentError;
use crate::document::HttpMethod;
use crate::document::OpenApiDocument;
use crate::document::success_code;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Kind of breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCategory {
    /// A component schema was removed.
    SchemaRemoved,
    /// A property was removed from a schema.
    FieldRemoved,
    /// An operation (or a whole path) was removed.
    EndpointRemoved,
    /// The success status code of an operation changed.
    ResponseCodeChanged,
    /// The `type` of a property changed.
    TypeChanged,
    /// A property became required.
    RequiredFieldAdded,
    /// A property stopped being required.
    RequiredFieldRemoved,
    /// A value was dropped from a property `enum`.
    EnumValueRemoved,
}

impl ChangeCategory {
    /// Returns the snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchemaRemoved => "schema_removed",
            Self::FieldRemoved => "field_removed",
            Self::EndpointRemoved => "endpoint_removed",
            Self::ResponseCodeChanged => "response_code_changed",
            Self::TypeChanged => "type_changed",
            Self::RequiredFieldAdded => "required_field_added",
            Self::RequiredFieldRemoved => "required_field_removed",
            Self::EnumValueRemoved => "enum_value_removed",
        }
    }

    /// Returns the severity assigned to this category.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::SchemaRemoved | Self::FieldRemoved | Self::EndpointRemoved | Self::TypeChanged => {
                Severity::Critical
            }
            Self::ResponseCodeChanged | Self::RequiredFieldAdded | Self::EnumValueRemoved => {
                Severity::High
            }
            Self::RequiredFieldRemoved => Severity::Medium,
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Severity of a breaking change, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Notable but usually safe.
    Medium,
    /// Likely to break some consumers.
    High,
    /// Breaks every consumer of the element.
    Critical,
}

impl Severity {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parses a lowercase label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Changes
// ============================================================================

/// A single consumer-visible regression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakingChange {
    /// Kind of change.
    pub category: ChangeCategory,
    /// Severity of the change.
    pub severity: Severity,
    /// Location, e.g. `schemas/User.email` or `POST /users`.
    pub path: String,
    /// Value in the old document.
    pub old_value: Option<Value>,
    /// Value in the new document.
    pub new_value: Option<Value>,
    /// What changed.
    pub description: String,
    /// Who is affected and how.
    pub impact: String,
}

impl BreakingChange {
    /// Builds a change, taking the severity from its category.
    fn new(
        category: ChangeCategory,
        path: String,
        old_value: Option<Value>,
        new_value: Option<Value>,
        description: String,
        impact: String,
    ) -> Self {
        Self {
            category,
            severity: category.severity(),
            path,
            old_value,
            new_value,
            description,
            impact,
        }
    }
}

impl fmt::Display for BreakingChange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}: {} at {}",
            self.severity.as_str().to_ascii_uppercase(),
            self.category,
            self.path
        )
    }
}

/// Counts of changes by severity and category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    /// Number of changes.
    pub total: usize,
    /// Count per severity.
    pub by_severity: BTreeMap<Severity, usize>,
    /// Count per category.
    pub by_category: BTreeMap<ChangeCategory, usize>,
    /// Number of critical changes.
    pub critical_count: usize,
}

/// Summarizes a list of changes.
#[must_use]
pub fn summarize(changes: &[BreakingChange]) -> ChangeSummary {
    let mut summary = ChangeSummary {
        total: changes.len(),
        ..ChangeSummary::default()
    };
    for change in changes {
        *summary.by_severity.entry(change.severity).or_default() += 1;
        *summary.by_category.entry(change.category).or_default() += 1;
    }
    summary.critical_count = summary.by_severity.get(&Severity::Critical).copied().unwrap_or(0);
    summary
}

/// Returns the most severe level among `changes`.
#[must_use]
pub fn highest_severity(changes: &[BreakingChange]) -> Option<Severity> {
    changes.iter().map(|change| change.severity).max()
}

// ============================================================================
// SECTION: Detector
// ============================================================================

/// Compares two versions of a contract.
#[derive(Debug, Clone)]
pub struct BreakingChangeDetector {
    /// Current contract.
    old: OpenApiDocument,
    /// Proposed contract.
    new: OpenApiDocument,
}

impl BreakingChangeDetector {
    /// Creates a detector from two loaded documents.
    #[must_use]
    pub const fn new(old: OpenApiDocument, new: OpenApiDocument) -> Self {
        Self {
            old,
            new,
        }
    }

    /// Loads both documents from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when either document fails to load.
    pub fn from_paths(old: &Path, new: &Path) -> Result<Self, DocumentError> {
        Ok(Self::new(OpenApiDocument::load(old)?, OpenApiDocument::load(new)?))
    }

    /// Returns the old document.
    #[must_use]
    pub const fn old(&self) -> &OpenApiDocument {
        &self.old
    }

    /// Returns the new document.
    #[must_use]
    pub const fn new_document(&self) -> &OpenApiDocument {
        &self.new
    }

    /// Runs every detector in order.
    #[must_use]
    pub fn detect_all_changes(&self) -> Vec<BreakingChange> {
        let mut changes = self.detect_schema_changes();
        changes.extend(self.detect_response_changes());
        changes.extend(self.detect_required_field_changes());
        changes.extend(self.detect_type_changes());
        changes.extend(self.detect_enum_changes());
        changes
    }

    /// Detects removed schemas, then removed properties.
    #[must_use]
    pub fn detect_schema_changes(&self) -> Vec<BreakingChange> {
        let old_schemas = schemas(&self.old);
        let new_schemas = schemas(&self.new);
        let mut changes = Vec::new();

        for name in old_schemas.keys() {
            if !new_schemas.contains_key(name) {
                changes.push(BreakingChange::new(
                    ChangeCategory::SchemaRemoved,
                    format!("schemas/{name}"),
                    Some(Value::String(name.clone())),
                    None,
                    format!("Schema '{name}' was removed"),
                    format!("All consumers using {name} will break"),
                ));
            }
        }

        for (name, old_schema, new_schema) in shared_schemas(old_schemas, new_schemas) {
            let new_properties = properties(new_schema);
            for (field, old_property) in properties(old_schema) {
                if !new_properties.contains_key(field) {
                    changes.push(BreakingChange::new(
                        ChangeCategory::FieldRemoved,
                        format!("schemas/{name}.{field}"),
                        Some(old_property.clone()),
                        None,
                        format!("Field '{field}' removed from {name}"),
                        format!("Consumers expecting '{field}' will fail"),
                    ));
                }
            }
        }
        changes
    }

    /// Detects removed operations and changed success codes.
    ///
    /// A path missing from the new document reports every operation it held.
    #[must_use]
    pub fn detect_response_changes(&self) -> Vec<BreakingChange> {
        let old_paths = self.old.paths().unwrap_or(&EMPTY);
        let new_paths = self.new.paths().unwrap_or(&EMPTY);
        let mut changes = Vec::new();

        for (path, old_item) in old_paths {
            let new_item = new_paths.get(path);
            for method in HttpMethod::ALL {
                let Some(old_operation) = old_item.get(method.as_str()) else {
                    continue;
                };
                let Some(new_operation) = new_item.and_then(|item| item.get(method.as_str()))
                else {
                    changes.push(BreakingChange::new(
                        ChangeCategory::EndpointRemoved,
                        format!("{method} {path}"),
                        Some(Value::String(method.as_str().to_string())),
                        None,
                        format!("Endpoint {method} {path} was removed"),
                        "All consumers calling this endpoint will fail".to_string(),
                    ));
                    continue;
                };
                if let (Some(old_code), Some(new_code)) =
                    (success_code(old_operation), success_code(new_operation))
                    && old_code != new_code
                {
                    changes.push(BreakingChange::new(
                        ChangeCategory::ResponseCodeChanged,
                        format!("{method} {path}"),
                        Some(Value::String(old_code.to_string())),
                        Some(Value::String(new_code.to_string())),
                        format!("Success response code changed from {old_code} to {new_code}"),
                        format!("Consumers checking for {old_code} will miss successful responses"),
                    ));
                }
            }
        }
        changes
    }

    /// Detects properties that became required or stopped being required.
    #[must_use]
    pub fn detect_required_field_changes(&self) -> Vec<BreakingChange> {
        let mut changes = Vec::new();
        for (name, old_schema, new_schema) in shared_schemas(schemas(&self.old), schemas(&self.new))
        {
            let old_required = required(old_schema);
            let new_required = required(new_schema);
            let old_value = Some(to_array(&old_required));
            let new_value = Some(to_array(&new_required));

            for field in new_required.difference(&old_required) {
                changes.push(BreakingChange::new(
                    ChangeCategory::RequiredFieldAdded,
                    format!("schemas/{name}.required"),
                    old_value.clone(),
                    new_value.clone(),
                    format!("Field '{field}' is now required in {name}"),
                    format!("Existing requests without '{field}' will fail validation"),
                ));
            }
            for field in old_required.difference(&new_required) {
                changes.push(BreakingChange::new(
                    ChangeCategory::RequiredFieldRemoved,
                    format!("schemas/{name}.required"),
                    old_value.clone(),
                    new_value.clone(),
                    format!("Field '{field}' is no longer required in {name}"),
                    "Field is now optional (usually safe change)".to_string(),
                ));
            }
        }
        changes
    }

    /// Detects properties whose declared `type` changed.
    #[must_use]
    pub fn detect_type_changes(&self) -> Vec<BreakingChange> {
        let mut changes = Vec::new();
        for (name, field, old_property, new_property) in self.shared_properties() {
            let (Some(old_type), Some(new_type)) = (old_property.get("type"), new_property.get("type"))
            else {
                continue;
            };
            if old_type != new_type {
                changes.push(BreakingChange::new(
                    ChangeCategory::TypeChanged,
                    format!("schemas/{name}.{field}"),
                    Some(old_type.clone()),
                    Some(new_type.clone()),
                    format!(
                        "Field '{field}' type changed from {} to {}",
                        type_label(old_type),
                        type_label(new_type)
                    ),
                    "Type mismatch will cause parsing errors".to_string(),
                ));
            }
        }
        changes
    }

    /// Detects values dropped from a property `enum`.
    ///
    /// Removing the `enum` keyword entirely widens the property and is not reported.
    #[must_use]
    pub fn detect_enum_changes(&self) -> Vec<BreakingChange> {
        let mut changes = Vec::new();
        for (name, field, old_property, new_property) in self.shared_properties() {
            let (Some(old_values), Some(new_values)) = (
                old_property.get("enum").and_then(Value::as_array),
                new_property.get("enum").and_then(Value::as_array),
            ) else {
                continue;
            };
            for value in old_values {
                if !new_values.contains(value) {
                    changes.push(BreakingChange::new(
                        ChangeCategory::EnumValueRemoved,
                        format!("schemas/{name}.{field}"),
                        Some(value.clone()),
                        None,
                        format!("Enum value {value} removed from '{field}' in {name}"),
                        format!("Consumers sending or expecting {value} will fail validation"),
                    ));
                }
            }
        }
        changes
    }

    /// Yields `(schema, field, old, new)` for properties present in both versions.
    fn shared_properties(&self) -> Vec<(&str, &str, &Value, &Value)> {
        let mut shared = Vec::new();
        for (name, old_schema, new_schema) in shared_schemas(schemas(&self.old), schemas(&self.new))
        {
            let new_properties = properties(new_schema);
            for (field, old_property) in properties(old_schema) {
                if let Some(new_property) = new_properties.get(field) {
                    shared.push((name, field.as_str(), old_property, new_property));
                }
            }
        }
        shared
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Shared empty map for documents without components or properties.
static EMPTY: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// Returns `components.schemas`, or an empty map.
fn schemas(document: &OpenApiDocument) -> &Map<String, Value> {
    document.schemas().unwrap_or(&EMPTY)
}

/// Returns a schema's `properties`, or an empty map.
fn properties(schema: &Value) -> &Map<String, Value> {
    schema.get("properties").and_then(Value::as_object).unwrap_or(&EMPTY)
}

/// Pairs schemas present in both maps, in old-document key order.
fn shared_schemas<'a>(
    old: &'a Map<String, Value>,
    new: &'a Map<String, Value>,
) -> Vec<(&'a str, &'a Value, &'a Value)> {
    old.iter()
        .filter_map(|(name, old_schema)| {
            new.get(name).map(|new_schema| (name.as_str(), old_schema, new_schema))
        })
        .collect()
}

/// Returns a schema's `required` names as a sorted set.
fn required(schema: &Value) -> BTreeSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect()
}

/// Converts a name set into a JSON array.
fn to_array(names: &BTreeSet<&str>) -> Value {
    Value::Array(names.iter().map(|name| Value::String((*name).to_string())).collect())
}

/// Renders a `type` value without JSON quoting when it is a plain string.
fn type_label(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), str::to_string)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
