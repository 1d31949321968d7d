//! Delta computation.
//!
//! Pure structural comparison of two value trees. Objects diff key-by-key,
//! arrays diff positionally with move detection (common head/tail trim, then
//! a longest-common-subsequence match over the middle), scalars replace
//! whole. Absent keys and explicit `null` are distinct throughout.

use serde_json::{json, Map, Value};

/// Options for delta computation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Object keys probed, in order, for an identity hash when matching
    /// array items. Items whose objects carry none of these keys fall back
    /// to a same-position sentinel, so same-index objects still pair up for
    /// nested diffing.
    pub hash_keys: Vec<String>,
    /// Detect array item moves instead of emitting remove+add pairs.
    pub detect_move: bool,
    /// Include the moved value in slot 0 of the move tuple.
    pub include_value_on_move: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            hash_keys: vec!["id".to_string(), "name".to_string(), "url".to_string()],
            detect_move: true,
            include_value_on_move: true,
        }
    }
}

/// Compute the delta between two values with default options.
///
/// Returns `None` when the values are structurally equal. Total: there are
/// no error conditions.
pub fn diff(before: &Value, after: &Value) -> Option<Value> {
    diff_with(before, after, &DiffOptions::default())
}

/// Compute the delta between two values.
pub fn diff_with(before: &Value, after: &Value, options: &DiffOptions) -> Option<Value> {
    diff_values(before, after, options)
}

fn diff_values(old: &Value, new: &Value, options: &DiffOptions) -> Option<Value> {
    if old == new {
        return None;
    }
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            diff_objects(old_map, new_map, options)
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            diff_arrays(old_items, new_items, options)
        }
        _ => Some(json!([old.clone(), new.clone()])),
    }
}

fn diff_objects(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    options: &DiffOptions,
) -> Option<Value> {
    let mut delta = Map::new();

    // Removed and changed keys.
    for (key, old_value) in old {
        match new.get(key) {
            Some(new_value) => {
                if let Some(child) = diff_values(old_value, new_value, options) {
                    delta.insert(key.clone(), child);
                }
            }
            None => {
                delta.insert(key.clone(), json!([old_value.clone(), 0, 0]));
            }
        }
    }

    // Added keys.
    for (key, new_value) in new {
        if !old.contains_key(key) {
            delta.insert(key.clone(), json!([new_value.clone()]));
        }
    }

    if delta.is_empty() {
        None
    } else {
        Some(Value::Object(delta))
    }
}

fn diff_arrays(old: &[Value], new: &[Value], options: &DiffOptions) -> Option<Value> {
    let old_len = old.len();
    let new_len = new.len();
    let mut delta = Map::new();

    // Trim the common head. Matched positions may still differ in content
    // (identity-matched objects), which surfaces as a nested delta.
    let mut head = 0;
    while head < old_len
        && head < new_len
        && items_match(&old[head], &new[head], head, head, options)
    {
        if let Some(child) = diff_values(&old[head], &new[head], options) {
            delta.insert(head.to_string(), child);
        }
        head += 1;
    }

    // Trim the common tail.
    let mut tail = 0;
    while tail < old_len - head
        && tail < new_len - head
        && items_match(
            &old[old_len - 1 - tail],
            &new[new_len - 1 - tail],
            old_len - 1 - tail,
            new_len - 1 - tail,
            options,
        )
    {
        if let Some(child) = diff_values(
            &old[old_len - 1 - tail],
            &new[new_len - 1 - tail],
            options,
        ) {
            delta.insert((new_len - 1 - tail).to_string(), child);
        }
        tail += 1;
    }

    if head + tail == old_len {
        // Every old item is accounted for: the middle of `new` is additions.
        for index in head..new_len - tail {
            delta.insert(index.to_string(), json!([new[index].clone()]));
        }
    } else if head + tail == new_len {
        // Every new item is accounted for: the middle of `old` is removals.
        for index in head..old_len - tail {
            delta.insert(format!("_{index}"), json!([old[index].clone(), 0, 0]));
        }
    } else {
        let pairs = lcs_pairs(
            &old[head..old_len - tail],
            &new[head..new_len - tail],
            head,
            options,
        );

        let mut matched_old = vec![false; old_len];
        let mut matched_new = vec![false; new_len];
        for &(old_index, new_index) in &pairs {
            matched_old[old_index] = true;
            matched_new[new_index] = true;
            if let Some(child) = diff_values(&old[old_index], &new[new_index], options) {
                delta.insert(new_index.to_string(), child);
            }
        }

        let removed: Vec<usize> = (head..old_len - tail)
            .filter(|&index| !matched_old[index])
            .collect();
        let mut added: Vec<usize> = (head..new_len - tail)
            .filter(|&index| !matched_new[index])
            .collect();

        for old_index in removed {
            let moved_to = if options.detect_move {
                added
                    .iter()
                    .position(|&new_index| {
                        items_match(&old[old_index], &new[new_index], old_index, new_index, options)
                            || old[old_index] == new[new_index]
                    })
                    .map(|position| added.remove(position))
            } else {
                None
            };

            match moved_to {
                Some(new_index) => {
                    let slot = if options.include_value_on_move {
                        old[old_index].clone()
                    } else {
                        Value::String(String::new())
                    };
                    delta.insert(format!("_{old_index}"), json!([slot, new_index, 3]));
                    // A moved item may also have changed in content.
                    if let Some(child) = diff_values(&old[old_index], &new[new_index], options) {
                        delta.insert(new_index.to_string(), child);
                    }
                }
                None => {
                    delta.insert(
                        format!("_{old_index}"),
                        json!([old[old_index].clone(), 0, 0]),
                    );
                }
            }
        }

        for new_index in added {
            delta.insert(new_index.to_string(), json!([new[new_index].clone()]));
        }
    }

    if delta.is_empty() {
        None
    } else {
        delta.insert(
            crate::delta::ARRAY_MARKER.to_string(),
            Value::String(crate::delta::ARRAY_MARKER_VALUE.to_string()),
        );
        Some(Value::Object(delta))
    }
}

/// Whether two array items refer to the same logical item.
///
/// Objects compare by identity hash; everything else compares structurally.
fn items_match(a: &Value, b: &Value, a_index: usize, b_index: usize, options: &DiffOptions) -> bool {
    match (a, b) {
        (Value::Object(a_map), Value::Object(b_map)) => {
            object_hash(a_map, a_index, options) == object_hash(b_map, b_index, options)
        }
        _ => a == b,
    }
}

fn object_hash(map: &Map<String, Value>, index: usize, options: &DiffOptions) -> String {
    for key in &options.hash_keys {
        match map.get(key) {
            Some(Value::String(text)) if !text.is_empty() => return text.clone(),
            Some(Value::Number(number)) => return number.to_string(),
            _ => {}
        }
    }
    format!("$$index:{index}")
}

/// Longest common subsequence over the trimmed middles, as matched
/// (old_index, new_index) pairs in absolute index space.
fn lcs_pairs(
    old: &[Value],
    new: &[Value],
    offset: usize,
    options: &DiffOptions,
) -> Vec<(usize, usize)> {
    let n = old.len();
    let m = new.len();
    // lengths[i][j] = LCS length of old[i..] vs new[j..]
    let mut lengths = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lengths[i][j] = if items_match(&old[i], &new[j], offset + i, offset + j, options) {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if items_match(&old[i], &new[j], offset + i, offset + j, options) {
            pairs.push((offset + i, offset + j));
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_values_no_delta() {
        let record = json!({"key": "k1", "name": {"en": "Shoes"}, "roles": ["A"]});
        assert_eq!(diff(&record, &record), None);
    }

    #[test]
    fn scalar_change() {
        let delta = diff(&json!({"key": "k1"}), &json!({"key": "k2"})).unwrap();
        assert_eq!(delta, json!({"key": ["k1", "k2"]}));
    }

    #[test]
    fn scalar_added_and_removed() {
        let delta = diff(&json!({"old": 1}), &json!({"new": 2})).unwrap();
        assert_eq!(delta, json!({"old": [1, 0, 0], "new": [2]}));
    }

    #[test]
    fn null_is_distinct_from_absent() {
        assert_eq!(
            diff(&json!({"a": null}), &json!({})),
            Some(json!({"a": [null, 0, 0]}))
        );
        assert_eq!(
            diff(&json!({}), &json!({"a": null})),
            Some(json!({"a": [null]}))
        );
        assert_eq!(
            diff(&json!({"a": null}), &json!({"a": 1})),
            Some(json!({"a": [null, 1]}))
        );
    }

    #[test]
    fn nested_object_change_is_partial() {
        let delta = diff(
            &json!({"name": {"en": "Shoes", "de": "Schuhe"}}),
            &json!({"name": {"en": "Boots", "de": "Schuhe"}}),
        )
        .unwrap();
        assert_eq!(delta, json!({"name": {"en": ["Shoes", "Boots"]}}));
    }

    #[test]
    fn type_change_is_whole_replace() {
        let delta = diff(&json!({"v": 1}), &json!({"v": {"nested": true}})).unwrap();
        assert_eq!(delta, json!({"v": [1, {"nested": true}]}));
    }

    #[test]
    fn array_append() {
        let delta = diff(&json!({"roles": ["A"]}), &json!({"roles": ["A", "B"]})).unwrap();
        assert_eq!(delta, json!({"roles": {"_t": "a", "1": ["B"]}}));
    }

    #[test]
    fn array_remove() {
        let delta = diff(&json!({"roles": ["A", "B"]}), &json!({"roles": ["A"]})).unwrap();
        assert_eq!(delta, json!({"roles": {"_t": "a", "_1": ["B", 0, 0]}}));
    }

    #[test]
    fn array_swap_and_append_is_move_plus_add() {
        let delta = diff(&json!(["A", "B"]), &json!(["B", "A", "C"])).unwrap();
        assert_eq!(delta, json!({"_t": "a", "_0": ["A", 1, 3], "2": ["C"]}));
    }

    #[test]
    fn identity_matched_item_diffs_in_place() {
        let delta = diff(
            &json!([{"id": "a", "v": 1}]),
            &json!([{"id": "a", "v": 2}]),
        )
        .unwrap();
        assert_eq!(delta, json!({"_t": "a", "0": {"v": [1, 2]}}));
    }

    #[test]
    fn moved_item_with_content_change_has_both_entries() {
        let delta = diff(
            &json!([{"id": "a", "v": 1}, {"id": "b"}]),
            &json!([{"id": "b"}, {"id": "a", "v": 2}]),
        )
        .unwrap();
        assert_eq!(
            delta,
            json!({
                "_t": "a",
                "_0": [{"id": "a", "v": 1}, 1, 3],
                "1": {"v": [1, 2]},
            })
        );
    }

    #[test]
    fn unhashed_objects_pair_by_position() {
        let delta = diff(
            &json!([{"country": "DE", "amount": 100}]),
            &json!([{"country": "DE", "amount": 200}]),
        )
        .unwrap();
        assert_eq!(delta, json!({"_t": "a", "0": {"amount": [100, 200]}}));
    }

    #[test]
    fn detect_move_disabled_emits_remove_and_add() {
        let options = DiffOptions {
            detect_move: false,
            ..Default::default()
        };
        let delta = diff_with(&json!(["A", "B"]), &json!(["B", "A", "C"]), &options).unwrap();
        assert_eq!(
            delta,
            json!({"_t": "a", "_0": ["A", 0, 0], "1": ["A"], "2": ["C"]})
        );
    }

    #[test]
    fn empty_array_to_items_is_all_additions() {
        let delta = diff(&json!([]), &json!(["A", "B"])).unwrap();
        assert_eq!(delta, json!({"_t": "a", "0": ["A"], "1": ["B"]}));
    }

    #[test]
    fn top_level_scalar_change() {
        assert_eq!(diff(&json!("a"), &json!("b")), Some(json!(["a", "b"])));
    }
}
