// crates/contract-gate-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog coverage and placeholder substitution.
// Purpose: Ensure every message the binary emits resolves to catalog text.
// Dependencies: contract-gate-cli i18n module
// ============================================================================

//! ## Overview
//! Scans the binary source for `t!` keys and checks each one is cataloged,
//! then exercises substitution and the missing-key fallback.

use std::collections::BTreeSet;

use crate::i18n::MessageArg;
use crate::i18n::catalog;
use crate::i18n::translate;

/// Source of the binary entry point.
const MAIN_SOURCE: &str = include_str!("../main.rs");

/// Returns every literal key passed to `t!` in `source`.
///
/// Matches such as `format!(` are skipped by requiring a non-identifier
/// character before the `t`.
fn used_keys(source: &str) -> BTreeSet<&str> {
    source
        .match_indices("t!(")
        .filter(|(index, _)| {
            source[.. *index]
                .chars()
                .next_back()
                .is_none_or(|previous| !previous.is_alphanumeric() && previous != '_')
        })
        .filter_map(|(index, _)| {
            let rest = source[index + 3 ..].trim_start().strip_prefix('"')?;
            rest.split_once('"').map(|(key, _)| key)
        })
        .collect()
}

#[test]
fn every_used_key_is_cataloged() {
    let keys = used_keys(MAIN_SOURCE);
    assert!(keys.len() > 20, "expected to find the CLI message keys, got {keys:?}");
    let missing: Vec<_> = keys.iter().filter(|key| !catalog().contains_key(**key)).collect();
    assert!(missing.is_empty(), "keys missing from the catalog: {missing:?}");
}

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "input.read_too_large",
        vec![
            MessageArg::new("kind", "instance"),
            MessageArg::new("path", "big.json"),
            MessageArg::new("size", "9"),
            MessageArg::new("limit", "8"),
        ],
    );
    assert_eq!(output, "Refusing to read instance at big.json because it is 9 bytes (limit 8).");
}

#[test]
fn macro_formats_display_values() {
    let output = crate::t!("spec.info.schemas", count = 2_usize, names = "User, Error");
    assert_eq!(output, "Schemas (2): User, Error");
}

#[test]
fn unknown_keys_fall_back_to_the_key() {
    assert_eq!(translate("no.such.key", Vec::new()), "no.such.key");
}

#[test]
fn unmatched_placeholders_are_left_intact() {
    let output =
        translate("schema.operation_invalid", vec![MessageArg::new("operation", "FETCH /x")]);
    assert!(output.starts_with("Invalid operation 'FETCH /x'"));
    assert!(output.contains("/users/{id}"));
}
