//! Breaking change property-based tests.
// crates/contract-gate-core/tests/proptest_diff.rs
// ============================================================================
// Module: Breaking Change Property-Based Tests
// Description: Randomized schema pairs for the change detector.
// Purpose: Ensure self-comparison is clean and removals are always reported.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use contract_gate_core::BreakingChangeDetector;
use contract_gate_core::ChangeCategory;
use contract_gate_core::OpenApiDocument;
use contract_gate_core::Severity;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

const TYPES: [&str; 5] = ["string", "integer", "number", "boolean", "array"];

fn document(fields: &[(String, usize)]) -> OpenApiDocument {
    let mut properties = Map::new();
    for (name, kind) in fields {
        properties.insert(name.clone(), json!({"type": TYPES[kind % TYPES.len()]}));
    }
    OpenApiDocument::from_value(json!({
        "openapi": "3.0.3",
        "components": {"schemas": {"Item": {"type": "object", "properties": Value::Object(properties)}}}
    }))
    .unwrap()
}

fn field_strategy() -> impl Strategy<Value = Vec<(String, usize)>> {
    prop::collection::btree_map("[a-z]{1,8}", 0usize .. 5, 0 .. 12)
        .prop_map(|map| map.into_iter().collect())
}

proptest! {
    #[test]
    fn self_comparison_is_clean(fields in field_strategy()) {
        let detector = BreakingChangeDetector::new(document(&fields), document(&fields));
        prop_assert!(detector.detect_all_changes().is_empty());
    }

    #[test]
    fn every_dropped_field_is_reported(fields in field_strategy(), keep in prop::collection::vec(any::<bool>(), 12)) {
        let kept: Vec<(String, usize)> = fields
            .iter()
            .zip(keep.iter())
            .filter(|(_, keep)| **keep)
            .map(|(field, _)| field.clone())
            .collect();
        let detector = BreakingChangeDetector::new(document(&fields), document(&kept));
        let changes = detector.detect_all_changes();
        let reported: BTreeSet<String> = changes
            .iter()
            .filter(|change| change.category == ChangeCategory::FieldRemoved)
            .map(|change| change.path.trim_start_matches("schemas/Item.").to_string())
            .collect();
        let dropped: BTreeSet<String> = fields
            .iter()
            .filter(|field| !kept.contains(field))
            .map(|(name, _)| name.clone())
            .collect();
        prop_assert_eq!(reported, dropped);
        prop_assert!(changes.iter().all(|change| change.severity == Severity::Critical));
    }
}
