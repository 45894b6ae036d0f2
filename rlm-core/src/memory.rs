//! ABOUTME: Memory estimation used for admission control, never for real allocation accounting
//! ABOUTME: Strings cost 2*len+40 bytes, arrays/objects recurse with a 40-byte overhead, scalars cost 8

use crate::types::Value;

const STRING_OVERHEAD: usize = 40;
const OBJECT_OVERHEAD: usize = 40;
const SCALAR_BYTES: usize = 8;

/// Estimates the in-memory footprint of a JSON-shaped value for quota
/// checks. This is intentionally a rough projection, not a real allocator
/// accounting pass.
#[must_use]
pub fn estimate_value_bytes(value: &Value) -> usize {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => SCALAR_BYTES,
        Value::String(s) => 2 * s.len() + STRING_OVERHEAD,
        Value::Array(items) => {
            OBJECT_OVERHEAD + items.iter().map(estimate_value_bytes).sum::<usize>()
        }
        Value::Object(map) => {
            OBJECT_OVERHEAD
                + map
                    .iter()
                    .map(|(k, v)| 2 * k.len() + STRING_OVERHEAD + estimate_value_bytes(v))
                    .sum::<usize>()
        }
    }
}

/// Estimates the footprint of a raw string (a context's content, for example).
#[must_use]
pub fn estimate_string_bytes(s: &str) -> usize {
    2 * s.len() + STRING_OVERHEAD
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_costs_eight_bytes() {
        assert_eq!(estimate_value_bytes(&json!(42)), 8);
        assert_eq!(estimate_value_bytes(&json!(true)), 8);
        assert_eq!(estimate_value_bytes(&json!(null)), 8);
    }

    #[test]
    fn string_cost_matches_formula() {
        let v = json!("hello");
        assert_eq!(estimate_value_bytes(&v), 2 * 5 + 40);
    }

    #[test]
    fn array_recurses_with_overhead() {
        let v = json!([1, 2, 3]);
        assert_eq!(estimate_value_bytes(&v), 40 + 8 * 3);
    }
}
