//! Pre-diff record normalization.

use serde_json::Value;

/// Materialize empty arrays for array fields present on only one side.
///
/// Without this, a collection going from absent to populated (or populated
/// to absent) diffs as a whole-field tuple, bypassing the element-wise
/// array machinery. With it, the differ sees `[] -> [a, b]` and emits
/// per-item entries.
pub fn copy_empty_array_props(before: &Value, now: &Value) -> (Value, Value) {
    let mut before = before.clone();
    let mut now = now.clone();

    if let (Value::Object(before_map), Value::Object(now_map)) = (&mut before, &mut now) {
        for (key, value) in before_map.iter() {
            if value.is_array() && !now_map.contains_key(key) {
                now_map.insert(key.clone(), Value::Array(Vec::new()));
            }
        }
        for (key, value) in now_map.iter() {
            if value.is_array() && !before_map.contains_key(key) {
                before_map.insert(key.clone(), Value::Array(Vec::new()));
            }
        }
    }

    (before, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fills_missing_side_with_empty_array() {
        let (before, now) = copy_empty_array_props(
            &json!({"assets": [{"id": "a"}]}),
            &json!({"key": "k"}),
        );
        assert_eq!(now, json!({"key": "k", "assets": []}));
        assert_eq!(before, json!({"assets": [{"id": "a"}]}));
    }

    #[test]
    fn fills_both_directions() {
        let (before, now) = copy_empty_array_props(
            &json!({"assets": [1]}),
            &json!({"roles": ["A"]}),
        );
        assert_eq!(before, json!({"assets": [1], "roles": []}));
        assert_eq!(now, json!({"roles": ["A"], "assets": []}));
    }

    #[test]
    fn leaves_scalar_fields_alone() {
        let (before, now) = copy_empty_array_props(&json!({"key": "k1"}), &json!({}));
        assert_eq!(before, json!({"key": "k1"}));
        assert_eq!(now, json!({}));
    }
}
