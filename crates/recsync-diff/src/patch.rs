//! Delta application: the inverse of [`crate::diff`].
//!
//! Array deltas apply in three phases: removals and move-sources descending
//! by index, then insertions ascending, then nested in-place changes. Moved
//! values are captured from the target before any removal so the phases
//! cannot observe each other's index shifts.

use serde_json::{Map, Value};

use crate::delta::{is_array_delta, ArrayDelta, ScalarDelta, ARRAY_MARKER};
use crate::error::{PatchError, PatchResult};

/// Apply `delta` to `target`, producing the patched value.
///
/// `patch(before, diff(before, after))` reconstructs `after` for any pair of
/// values.
pub fn patch(target: &Value, delta: &Value) -> PatchResult<Value> {
    match delta {
        Value::Array(_) => match ScalarDelta::parse(delta) {
            Some(ScalarDelta::Added(value)) | Some(ScalarDelta::Changed { new: value, .. }) => {
                Ok(value.clone())
            }
            Some(ScalarDelta::Removed(_)) | Some(ScalarDelta::Moved { .. }) => Err(
                PatchError::MalformedDelta("removal or move at value root".to_string()),
            ),
            None => Err(PatchError::MalformedDelta(
                "tuple with unsupported shape".to_string(),
            )),
        },
        Value::Object(map) if is_array_delta(delta) => {
            let items = target
                .as_array()
                .ok_or(PatchError::TargetMismatch { expected: "array" })?;
            patch_array(items, map)
        }
        Value::Object(map) => {
            let fields = target
                .as_object()
                .ok_or(PatchError::TargetMismatch { expected: "object" })?;
            patch_object(fields, map)
        }
        _ => Err(PatchError::MalformedDelta(
            "delta must be a tuple or delta object".to_string(),
        )),
    }
}

fn patch_object(target: &Map<String, Value>, delta: &Map<String, Value>) -> PatchResult<Value> {
    let mut fields = target.clone();

    for (key, entry) in delta {
        if entry.is_array() {
            match ScalarDelta::parse(entry) {
                Some(ScalarDelta::Added(value)) | Some(ScalarDelta::Changed { new: value, .. }) => {
                    fields.insert(key.clone(), value.clone());
                }
                Some(ScalarDelta::Removed(_)) => {
                    fields.remove(key);
                }
                Some(ScalarDelta::Moved { .. }) | None => {
                    return Err(PatchError::MalformedDelta(format!(
                        "unexpected tuple under object key `{key}`"
                    )));
                }
            }
        } else {
            let current = fields
                .get(key)
                .ok_or_else(|| PatchError::MissingKey(key.clone()))?;
            let patched = patch(current, entry)?;
            fields.insert(key.clone(), patched);
        }
    }

    Ok(Value::Object(fields))
}

fn patch_array(target: &[Value], delta: &Map<String, Value>) -> PatchResult<Value> {
    let mut to_remove: Vec<usize> = Vec::new();
    let mut to_insert: Vec<(usize, Value)> = Vec::new();
    let mut nested: Vec<(usize, &Value)> = Vec::new();

    for (key, entry) in delta {
        if key == ARRAY_MARKER {
            continue;
        }
        match ArrayDelta::parse(key, entry) {
            Some(ArrayDelta::RemovedAt { index, .. }) => to_remove.push(index),
            Some(ArrayDelta::MovedFrom {
                old_index,
                new_index,
                ..
            }) => {
                // Capture the moved value before any index shifts.
                let value = target
                    .get(old_index)
                    .ok_or(PatchError::IndexOutOfRange(old_index))?
                    .clone();
                to_remove.push(old_index);
                to_insert.push((new_index, value));
            }
            Some(ArrayDelta::AddedAt { index, value }) => {
                to_insert.push((index, value.clone()));
            }
            Some(ArrayDelta::ChangedAt { index, delta }) => nested.push((index, delta)),
            None => {
                return Err(PatchError::MalformedDelta(format!(
                    "unclassifiable array delta key `{key}`"
                )));
            }
        }
    }

    let mut items = target.to_vec();

    to_remove.sort_unstable_by(|a, b| b.cmp(a));
    for index in to_remove {
        if index >= items.len() {
            return Err(PatchError::IndexOutOfRange(index));
        }
        items.remove(index);
    }

    to_insert.sort_unstable_by_key(|(index, _)| *index);
    for (index, value) in to_insert {
        if index > items.len() {
            return Err(PatchError::IndexOutOfRange(index));
        }
        items.insert(index, value);
    }

    for (index, child) in nested {
        let current = items
            .get(index)
            .ok_or(PatchError::IndexOutOfRange(index))?;
        let patched = patch(current, child)?;
        items[index] = patched;
    }

    Ok(Value::Array(items))
}
