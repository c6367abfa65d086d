// crates/contract-gate-core/src/schema.rs
// ============================================================================
// Module: JSON Schema Compliance
// Description: Validate JSON payloads against OpenAPI component schemas.
// Purpose: Report every way a payload departs from its contract.
// Dependencies: jsonschema, regex, serde_json, url
// ============================================================================

//! ## Overview
//! [`SchemaValidator::validate`] compiles an OpenAPI schema as JSON Schema
//! Draft 7 and collects every violation. OpenAPI 3.0 schemas differ from
//! JSON Schema in two ways that matter here:
//!
//! - `$ref` pointers such as `#/components/schemas/User` address the OpenAPI
//!   document, so the document's `components` are attached to the compiled
//!   root under the same key.
//! - `nullable: true` has no JSON Schema meaning; it is rewritten to a type
//!   union with `null` before compilation.
//!
//! The shallow helpers ([`SchemaValidator::validate_field_types`],
//! [`SchemaValidator::validate_required_fields`]) look only at the top-level
//! properties of a schema and are useful for targeted assertions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;
use std::sync::OnceLock;

use jsonschema::Draft;
use regex::Regex;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::document::OpenApiDocument;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path label used for violations at the payload root.
const ROOT_PATH: &str = "root";
/// Separator between path segments in violation paths.
const PATH_SEPARATOR: &str = " -> ";
/// Simple address pattern: local part, `@`, domain, dot, 2+ letter TLD.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Errors raised when a schema cannot be compiled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema is not valid JSON Schema.
    #[error("schema compilation failed: {0}")]
    Compile(String),
}

/// One way a payload departs from its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// `root`, or payload segments joined with ` -> `.
    pub path: String,
    /// Validator message.
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.path, self.message)
    }
}

/// Aggregate validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// True when no violations were found.
    pub valid: bool,
    /// Number of violations.
    pub error_count: usize,
    /// Formatted violations (`path: message`).
    pub errors: Vec<String>,
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validates JSON payloads against OpenAPI schemas.
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator {
    /// Whether `format` keywords are asserted.
    validate_formats: bool,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator {
    /// Creates a validator that asserts `format` keywords.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            validate_formats: true,
        }
    }

    /// Creates a validator that treats `format` as an annotation only.
    #[must_use]
    pub const fn without_formats() -> Self {
        Self {
            validate_formats: false,
        }
    }

    /// Validates `instance` against `schema`.
    ///
    /// Pass the owning `document` when the schema contains `$ref`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] when the schema cannot be compiled,
    /// including when a `$ref` cannot be resolved.
    pub fn validate(
        &self,
        instance: &Value,
        schema: &Value,
        document: Option<&OpenApiDocument>,
    ) -> Result<Vec<SchemaViolation>, SchemaError> {
        let compiled = self.compile(schema, document)?;
        Ok(compiled
            .iter_errors(instance)
            .map(|error| SchemaViolation {
                path: violation_path(&error.instance_path.to_string()),
                message: error.to_string(),
            })
            .collect())
    }

    /// Builds a [`ValidationSummary`] for `instance`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema cannot be compiled.
    pub fn summary(
        &self,
        instance: &Value,
        schema: &Value,
        document: Option<&OpenApiDocument>,
    ) -> Result<ValidationSummary, SchemaError> {
        let errors: Vec<String> = self
            .validate(instance, schema, document)?
            .iter()
            .map(ToString::to_string)
            .collect();
        Ok(ValidationSummary {
            valid: errors.is_empty(),
            error_count: errors.len(),
            errors,
        })
    }

    /// Compiles a schema, attaching document components when references exist.
    fn compile(
        &self,
        schema: &Value,
        document: Option<&OpenApiDocument>,
    ) -> Result<jsonschema::Validator, SchemaError> {
        let mut root = normalize_nullable(schema);
        if let Some(document) = document
            && contains_ref(schema)
        {
            let components = document
                .root()
                .get("components")
                .map_or_else(|| Value::Object(Map::new()), normalize_components);
            root = json!({ "allOf": [root], "components": components });
        }
        jsonschema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(self.validate_formats)
            .build(&root)
            .map_err(|err| SchemaError::Compile(err.to_string()))
    }

    /// Checks the JSON type of each declared top-level property present in `data`.
    ///
    /// Properties without a `type`, or with a type outside the JSON Schema
    /// set, are accepted.
    #[must_use]
    pub fn validate_field_types(&self, data: &Value, schema: &Value) -> Vec<String> {
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };
        let mut errors = Vec::new();
        for (name, property) in properties {
            let Some(value) = data.get(name) else {
                continue;
            };
            let Some(expected) = property.get("type").and_then(Value::as_str) else {
                continue;
            };
            if !matches_type(value, expected) {
                errors.push(format!(
                    "Field '{name}': expected {expected}, got {}",
                    json_type_name(value)
                ));
            }
        }
        errors
    }

    /// Lists every `required` property missing from `data`.
    #[must_use]
    pub fn validate_required_fields(&self, data: &Value, schema: &Value) -> Vec<String> {
        required_names(schema)
            .filter(|name| data.get(*name).is_none())
            .map(|name| format!("Required field '{name}' is missing"))
            .collect()
    }

    /// Returns true when `email` matches the simple address pattern.
    #[must_use]
    pub fn validate_email_format(&self, email: &str) -> bool {
        email_regex().is_some_and(|regex| regex.is_match(email))
    }

    /// Checks a value against a named format.
    ///
    /// Supports `email`, `uri` (http or https with a host), `ipv4`, and
    /// `ipv6`. Unknown formats are accepted.
    #[must_use]
    pub fn validate_format(&self, value: &Value, format: &str) -> bool {
        let text = value.as_str().map_or_else(|| value.to_string(), str::to_string);
        match format {
            "email" => self.validate_email_format(&text),
            "uri" => Url::parse(&text).is_ok_and(|url| {
                matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
            }),
            "ipv4" => text.parse::<Ipv4Addr>().is_ok(),
            "ipv6" => text.parse::<Ipv6Addr>().is_ok(),
            _ => true,
        }
    }

    /// Returns declared properties that are not listed in `required`.
    #[must_use]
    pub fn optional_fields(&self, schema: &Value) -> Vec<String> {
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };
        let required: Vec<&str> = required_names(schema).collect();
        properties
            .keys()
            .filter(|name| !required.contains(&name.as_str()))
            .cloned()
            .collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the compiled email pattern.
fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// Iterates the names listed in a schema's `required` array.
fn required_names(schema: &Value) -> impl Iterator<Item = &str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Returns true when `value` has the JSON Schema type `expected`.
fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

/// Names the JSON type of a value.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Turns a JSON pointer such as `/address/city` into `address -> city`.
fn violation_path(pointer: &str) -> String {
    if pointer.is_empty() || pointer == "/" {
        return ROOT_PATH.to_string();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// Returns true when any nested object carries `$ref`.
fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_ref),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

/// Schema keywords whose value is a map of names to subschemas.
const SCHEMA_MAP_KEYWORDS: [&str; 5] =
    ["properties", "patternProperties", "definitions", "$defs", "dependencies"];

/// Schema keywords whose value is a subschema or an array of subschemas.
const SUBSCHEMA_KEYWORDS: [&str; 12] = [
    "items",
    "additionalItems",
    "additionalProperties",
    "contains",
    "propertyNames",
    "not",
    "if",
    "then",
    "else",
    "allOf",
    "anyOf",
    "oneOf",
];

/// Rewrites OpenAPI `nullable: true` into JSON Schema null unions.
///
/// A string `type` becomes `[type, "null"]` and an `enum` gains `null`.
/// Schemas without a string `type` are wrapped in `anyOf` with `{"type": "null"}`.
/// Only schema positions are rewritten; property names and literal values
/// such as `enum` or `default` pass through untouched.
fn normalize_nullable(value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    let mut out = Map::new();
    for (key, child) in map {
        let normalized = if SCHEMA_MAP_KEYWORDS.contains(&key.as_str()) {
            normalize_schema_map(child)
        } else if SUBSCHEMA_KEYWORDS.contains(&key.as_str()) {
            match child {
                Value::Array(items) => Value::Array(items.iter().map(normalize_nullable).collect()),
                other => normalize_nullable(other),
            }
        } else {
            child.clone()
        };
        out.insert(key.clone(), normalized);
    }
    if out.remove("nullable") != Some(Value::Bool(true)) {
        return Value::Object(out);
    }
    if let Some(Value::Array(values)) = out.get_mut("enum")
        && !values.contains(&Value::Null)
    {
        values.push(Value::Null);
    }
    match out.get("type").cloned() {
        Some(Value::String(kind)) => {
            out.insert("type".to_string(), json!([kind, "null"]));
            Value::Object(out)
        }
        _ => json!({ "anyOf": [Value::Object(out), { "type": "null" }] }),
    }
}

/// Normalizes every schema of a name-to-schema map, keeping the names.
fn normalize_schema_map(value: &Value) -> Value {
    match value {
        Value::Object(entries) => Value::Object(
            entries.iter().map(|(name, schema)| (name.clone(), normalize_nullable(schema))).collect(),
        ),
        other => other.clone(),
    }
}

/// Normalizes `components.schemas`; other component sections are copied.
fn normalize_components(value: &Value) -> Value {
    let Value::Object(sections) = value else {
        return value.clone();
    };
    let mut out = sections.clone();
    if let Some(schemas) = sections.get("schemas") {
        out.insert("schemas".to_string(), normalize_schema_map(schemas));
    }
    Value::Object(out)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
