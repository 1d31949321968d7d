//! Array identity reconciliation.
//!
//! Array deltas speak two index spaces at once: bare keys are positions in
//! the *after* array, underscore keys positions in the *before* array. To
//! know which concrete item a delta entry is talking about on the *other*
//! side, elements are re-paired by an identity attribute (default `id`),
//! which survives reordering, insertion, and deletion.
//!
//! Resolution failures are expected for genuine adds and removes and never
//! raise: they leave one side of the pair unset, which callers treat as "no
//! matching object of that role".

use std::collections::BTreeMap;

use serde_json::Value;

/// Resolved positions of one delta key: where the item sits in the before
/// array and where it sits in the after array, when known.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionPair {
    /// Index into the before array, if the item exists there.
    pub old_index: Option<usize>,
    /// Index into the after array, if the item exists there.
    pub new_index: Option<usize>,
}

/// Map from delta key to resolved position pair.
pub type PositionMap = BTreeMap<String, PositionPair>;

/// The concrete items a delta key refers to, one per side.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchedPair<'a> {
    /// The item in the before array, if any.
    pub old_obj: Option<&'a Value>,
    /// The item in the after array, if any.
    pub new_obj: Option<&'a Value>,
}

/// Build the position map for one diffed array field.
///
/// Precomputes identity→index over both arrays, then resolves every delta
/// key through the identity on its own side to find the position on the
/// other side.
pub fn build_position_map(
    delta: &Value,
    before: &[Value],
    after: &[Value],
    identity_key: &str,
) -> PositionMap {
    let before_by_identity = index_by_identity(before, identity_key);
    let after_by_identity = index_by_identity(after, identity_key);

    let mut map = PositionMap::new();
    let Some(entries) = delta.as_object() else {
        return map;
    };

    for key in entries.keys() {
        if let Some(raw) = key.strip_prefix('_') {
            let Ok(old_index) = raw.parse::<usize>() else {
                continue;
            };
            let new_index = before
                .get(old_index)
                .and_then(|item| identity_of(item, identity_key))
                .and_then(|identity| after_by_identity.get(&identity).copied());
            map.insert(
                key.clone(),
                PositionPair {
                    old_index: Some(old_index),
                    new_index,
                },
            );
        } else if let Ok(new_index) = key.parse::<usize>() {
            let old_index = after
                .get(new_index)
                .and_then(|item| identity_of(item, identity_key))
                .and_then(|identity| before_by_identity.get(&identity).copied());
            map.insert(
                key.clone(),
                PositionPair {
                    old_index,
                    new_index: Some(new_index),
                },
            );
        }
        // anything else ("_t") is not a positional key
    }

    map
}

/// Look up the concrete items a delta key refers to.
///
/// Tolerates unknown keys, unresolved sides, and out-of-range indices.
pub fn matching_pair<'a>(
    map: &PositionMap,
    key: &str,
    before: &'a [Value],
    after: &'a [Value],
) -> MatchedPair<'a> {
    let pair = map.get(key).copied().unwrap_or_default();
    MatchedPair {
        old_obj: pair.old_index.and_then(|index| before.get(index)),
        new_obj: pair.new_index.and_then(|index| after.get(index)),
    }
}

fn identity_of(item: &Value, identity_key: &str) -> Option<String> {
    match item.get(identity_key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn index_by_identity(items: &[Value], identity_key: &str) -> BTreeMap<String, usize> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| identity_of(item, identity_key).map(|id| (id, index)))
        .collect()
}
