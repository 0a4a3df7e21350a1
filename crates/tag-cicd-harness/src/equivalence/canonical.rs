// crates/tag-cicd-harness/src/equivalence/canonical.rs
// ============================================================================
// Module: Canonical JSON
// Description: Key-order-insensitive normalization of JSON documents.
// Purpose: Reduce structural equality to literal equality.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Canonicalization sorts object keys recursively and preserves array order.
//! Integral floats inside the exactly representable range collapse to
//! integers, so `1` and `1.0` compare equal while `1` and `"1"` do not.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Floats at or beyond this magnitude are left untouched.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

// ============================================================================
// SECTION: Canonicalization
// ============================================================================

/// Returns a canonical copy of `value`. The input is not modified.
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|left, right| left.0.cmp(right.0));
            let canonical: Map<String, Value> =
                entries.into_iter().map(|(key, value)| (key.clone(), canonicalize(value))).collect();
            Value::Object(canonical)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(number) => Value::Number(canonical_number(number)),
        other => other.clone(),
    }
}

/// Collapses integral floats to integers.
#[allow(clippy::float_cmp, reason = "Integral floats compare exactly against their truncation.")]
fn canonical_number(number: &Number) -> Number {
    if number.is_f64()
        && let Some(float) = number.as_f64()
        && float.trunc() == float
        && float.abs() < MAX_EXACT_INTEGER
        && let Ok(integer) = format!("{float:.0}").parse::<i64>()
    {
        return Number::from(integer);
    }
    number.clone()
}

/// Returns true when both documents canonicalize to the same value.
#[must_use]
pub fn structurally_equal(left: &Value, right: &Value) -> bool {
    canonicalize(left) == canonicalize(right)
}

// ============================================================================
// SECTION: Divergence
// ============================================================================

/// Returns the JSON pointer of the first divergence between two documents,
/// or `None` when they are structurally equal. Keys are visited in sorted
/// order; the root is the empty pointer.
#[must_use]
pub fn first_divergence(left: &Value, right: &Value) -> Option<String> {
    divergence(&canonicalize(left), &canonicalize(right), String::new())
}

/// Walks two canonical values in lockstep.
fn divergence(left: &Value, right: &Value, pointer: String) -> Option<String> {
    match (left, right) {
        (Value::Object(left_map), Value::Object(right_map)) => {
            let keys: BTreeSet<&String> = left_map.keys().chain(right_map.keys()).collect();
            for key in keys {
                let child = format!("{pointer}/{}", escape_token(key));
                match (left_map.get(key), right_map.get(key)) {
                    (Some(left_value), Some(right_value)) => {
                        if let Some(found) = divergence(left_value, right_value, child) {
                            return Some(found);
                        }
                    }
                    _ => return Some(child),
                }
            }
            None
        }
        (Value::Array(left_items), Value::Array(right_items)) => {
            for (index, (left_item, right_item)) in left_items.iter().zip(right_items).enumerate() {
                if let Some(found) = divergence(left_item, right_item, format!("{pointer}/{index}")) {
                    return Some(found);
                }
            }
            if left_items.len() == right_items.len() {
                None
            } else {
                Some(format!("{pointer}/{}", left_items.len().min(right_items.len())))
            }
        }
        _ => (left != right).then_some(pointer),
    }
}

/// Escapes a key as a JSON pointer reference token.
fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
