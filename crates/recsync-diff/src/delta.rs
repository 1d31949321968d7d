//! Typed views over delta entries.
//!
//! The positional encoding packs four leaf cases into bare JSON arrays and
//! four array-item cases into a dual index-space key scheme (after-indices
//! vs underscore-prefixed before-indices). All interpretation of that scheme
//! lives here; callers match on [`ScalarDelta`] and [`ArrayDelta`] instead of
//! re-deriving tuple lengths and key prefixes.

use serde_json::Value;

/// Marker key present in every array delta object.
pub const ARRAY_MARKER: &str = "_t";
/// Marker value identifying a positional array delta.
pub const ARRAY_MARKER_VALUE: &str = "a";

/// A leaf delta entry: the bare-array tuple forms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarDelta<'a> {
    /// `[newValue]` — the value was added.
    Added(&'a Value),
    /// `[oldValue, newValue]` — the value was replaced.
    Changed {
        old: &'a Value,
        new: &'a Value,
    },
    /// `[oldValue, 0, 0]` — the value was removed.
    Removed(&'a Value),
    /// `[oldValue, newIndex, 3]` — an array item was moved. Only appears
    /// under underscore-prefixed keys inside array deltas.
    Moved {
        value: &'a Value,
        new_index: usize,
    },
}

impl<'a> ScalarDelta<'a> {
    /// Parse a tuple entry. Returns `None` for anything that is not a
    /// well-formed tuple (nested object deltas included).
    pub fn parse(entry: &'a Value) -> Option<Self> {
        let items = entry.as_array()?;
        match items.len() {
            1 => Some(Self::Added(&items[0])),
            2 => Some(Self::Changed {
                old: &items[0],
                new: &items[1],
            }),
            3 => match items[2].as_u64() {
                Some(0) => Some(Self::Removed(&items[0])),
                Some(3) => {
                    let new_index = items[1].as_u64()? as usize;
                    Some(Self::Moved {
                        value: &items[0],
                        new_index,
                    })
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// The post-state value: `None` for removals and moves.
    pub fn new_value(&self) -> Option<&'a Value> {
        match self {
            Self::Added(value) => Some(value),
            Self::Changed { new, .. } => Some(new),
            Self::Removed(_) | Self::Moved { .. } => None,
        }
    }
}

/// The post-state value of a tuple entry, `None` for removals, moves, and
/// non-tuple entries.
pub fn delta_value(entry: &Value) -> Option<&Value> {
    ScalarDelta::parse(entry).and_then(|delta| delta.new_value())
}

/// One classified entry of an array delta.
///
/// `AddedAt` and `ChangedAt` indices are positions in the *after* array;
/// `RemovedAt` and the `old_index` of `MovedFrom` are positions in the
/// *before* array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArrayDelta<'a> {
    /// Item added at after-index `index`.
    AddedAt {
        index: usize,
        value: &'a Value,
    },
    /// Item changed in place; `delta` is the nested delta of the item.
    ChangedAt {
        index: usize,
        delta: &'a Value,
    },
    /// Item removed at before-index `index`.
    RemovedAt {
        index: usize,
        value: &'a Value,
    },
    /// Item moved from before-index `old_index` to after-index `new_index`.
    MovedFrom {
        old_index: usize,
        new_index: usize,
        value: &'a Value,
    },
}

impl<'a> ArrayDelta<'a> {
    /// Classify one `(key, entry)` pair of an array delta object.
    ///
    /// The `"_t"` marker and malformed entries parse to `None`.
    pub fn parse(key: &str, entry: &'a Value) -> Option<Self> {
        if let Some(raw) = key.strip_prefix('_') {
            let index = raw.parse::<usize>().ok()?;
            return match ScalarDelta::parse(entry)? {
                ScalarDelta::Removed(value) => Some(Self::RemovedAt { index, value }),
                ScalarDelta::Moved { value, new_index } => Some(Self::MovedFrom {
                    old_index: index,
                    new_index,
                    value,
                }),
                _ => None,
            };
        }

        let index = key.parse::<usize>().ok()?;
        match entry {
            Value::Array(items) if items.len() == 1 => Some(Self::AddedAt {
                index,
                value: &items[0],
            }),
            Value::Object(map) if !map.is_empty() => Some(Self::ChangedAt { index, delta: entry }),
            _ => None,
        }
    }

    /// Iterate the classified entries of an array delta object.
    pub fn entries(delta: &'a Value) -> impl Iterator<Item = ArrayDelta<'a>> {
        delta
            .as_object()
            .into_iter()
            .flat_map(|map| map.iter())
            .filter_map(|(key, entry)| Self::parse(key, entry))
    }
}

/// Returns `true` if `delta` is a positional array delta (carries the
/// `"_t": "a"` marker).
pub fn is_array_delta(delta: &Value) -> bool {
    delta
        .as_object()
        .and_then(|map| map.get(ARRAY_MARKER))
        .and_then(Value::as_str)
        == Some(ARRAY_MARKER_VALUE)
}
