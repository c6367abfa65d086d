// crates/contract-gate-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The Contract Gate CLI stores user-facing strings in a small translation
//! catalog to keep messaging consistent and to prepare for future locales.
//! All runtime output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries loaded into the message bundle.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "contract-gate {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("input.read_failed", "Failed to read {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.parse_failed", "Failed to parse JSON at {path}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    ("spec.load_failed", "Failed to load contract {path}: {error}"),
    ("spec.path_missing", "No contract given: pass {flag} or set {key} in the config."),
    ("spec.info.document", "Contract: {document}"),
    ("spec.info.digest", "Digest: {digest}"),
    ("spec.info.openapi", "OpenAPI: {version}"),
    ("spec.info.title", "Title: {title} {version}"),
    ("spec.info.servers", "Servers: {servers}"),
    ("spec.info.schemas", "Schemas ({count}): {names}"),
    ("spec.info.operations", "Operations ({count}):"),
    ("spec.info.none", "none"),
    ("schema.lookup_failed", "Schema lookup failed: {error}"),
    (
        "schema.operation_invalid",
        "Invalid operation '{operation}'. Expected METHOD /path, e.g. \"GET /users/{id}\".",
    ),
    (
        "schema.no_success_status",
        "Operation {operation} declares no 2XX response; pass --status.",
    ),
    ("schema.compile_failed", "Schema {subject} could not be compiled: {error}"),
    ("probe.base_url_missing", "No base URL: pass --base-url or set probe.base_url ({error})."),
    ("probe.no_checks", "No probe checks configured; add [[probe.checks]] to the config."),
    ("probe.init_failed", "Failed to initialize compliance probe: {error}"),
    ("report.render_failed", "Failed to render report: {error}"),
    ("report.write_failed", "Failed to write report: {error}"),
    ("report.written", "Report written to {path}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the English catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static English catalog used by the CLI.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
