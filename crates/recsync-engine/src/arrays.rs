//! ADD/REMOVE/CHANGE/MOVE dispatch for ordered-collection fields.
//!
//! A record type configures one [`ArrayMapper`] per element-wise array field,
//! supplying a callback per entry class. The mapper classifies every entry of
//! the field's delta, resolves the concrete before/after items through the
//! identity reconciler, and concatenates whatever the callbacks return.
//!
//! Emission order within one invocation: removals, in-place changes, moves,
//! additions. Removals always precede additions so the remote side never
//! holds two items with the same identity mid-sequence.

use recsync_types::Command;
use serde_json::Value;

use recsync_diff::{is_array_delta, ArrayDelta, ARRAY_MARKER};

use crate::error::SyncResult;
use crate::pairs::{build_position_map, matching_pair};

/// Context handed to the change callback: an item that changed in place.
#[derive(Clone, Copy, Debug)]
pub struct ChangedItem<'a> {
    /// Position in the after array.
    pub index: usize,
    /// The matching before item, resolved by identity; absent when the
    /// identity does not exist on the before side.
    pub old: Option<&'a Value>,
    /// The after item.
    pub new: Option<&'a Value>,
    /// The nested delta of the item.
    pub delta: &'a Value,
}

/// Context handed to the move callback: an item that changed position.
#[derive(Clone, Copy, Debug)]
pub struct MovedItem<'a> {
    /// Position in the before array.
    pub old_index: usize,
    /// Position in the after array.
    pub new_index: usize,
    /// The item at its before position.
    pub old: Option<&'a Value>,
    /// The item at its after position.
    pub new: Option<&'a Value>,
}

type AddFn<'a> = Box<dyn Fn(&Value, usize) -> SyncResult<Vec<Command>> + 'a>;
type RemoveFn<'a> = Box<dyn Fn(&Value, usize) -> SyncResult<Vec<Command>> + 'a>;
type ChangeFn<'a> = Box<dyn Fn(ChangedItem<'_>) -> SyncResult<Vec<Command>> + 'a>;
type MoveFn<'a> = Box<dyn Fn(MovedItem<'_>) -> SyncResult<Vec<Command>> + 'a>;

/// Generic dispatcher for one ordered-collection field.
///
/// Entry classes with no callback are ignored; in particular, moves without
/// an `on_move` callback never degrade into remove+add churn.
pub struct ArrayMapper<'a> {
    field: String,
    identity_key: String,
    on_add: Option<AddFn<'a>>,
    on_remove: Option<RemoveFn<'a>>,
    on_change: Option<ChangeFn<'a>>,
    on_move: Option<MoveFn<'a>>,
}

impl<'a> ArrayMapper<'a> {
    /// A mapper for `field` with no callbacks registered.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            identity_key: "id".to_string(),
            on_add: None,
            on_remove: None,
            on_change: None,
            on_move: None,
        }
    }

    /// Override the identity attribute used to re-pair items (default `id`).
    pub fn identity_key(mut self, key: impl Into<String>) -> Self {
        self.identity_key = key.into();
        self
    }

    /// Called once per added item with `(new_item, after_index)`.
    pub fn on_add(mut self, f: impl Fn(&Value, usize) -> SyncResult<Vec<Command>> + 'a) -> Self {
        self.on_add = Some(Box::new(f));
        self
    }

    /// Called once per removed item with `(old_item, before_index)`.
    pub fn on_remove(mut self, f: impl Fn(&Value, usize) -> SyncResult<Vec<Command>> + 'a) -> Self {
        self.on_remove = Some(Box::new(f));
        self
    }

    /// Called once per item changed in place.
    pub fn on_change(mut self, f: impl Fn(ChangedItem<'_>) -> SyncResult<Vec<Command>> + 'a) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Called once per moved item.
    pub fn on_move(mut self, f: impl Fn(MovedItem<'_>) -> SyncResult<Vec<Command>> + 'a) -> Self {
        self.on_move = Some(Box::new(f));
        self
    }

    /// Dispatch the field's delta entries and concatenate the results.
    pub fn build(
        &self,
        delta_root: &Value,
        before: &Value,
        now: &Value,
    ) -> SyncResult<Vec<Command>> {
        let Some(field_delta) = delta_root.get(&self.field) else {
            return Ok(Vec::new());
        };
        // Whole-field tuples (field added or removed as a unit) belong to the
        // table-driven mappers, not element-wise dispatch.
        if !is_array_delta(field_delta) {
            return Ok(Vec::new());
        }

        let no_items = Vec::new();
        let before_items = before
            .get(&self.field)
            .and_then(Value::as_array)
            .unwrap_or(&no_items);
        let now_items = now
            .get(&self.field)
            .and_then(Value::as_array)
            .unwrap_or(&no_items);

        let positions =
            build_position_map(field_delta, before_items, now_items, &self.identity_key);

        let mut removals = Vec::new();
        let mut changes = Vec::new();
        let mut moves = Vec::new();
        let mut additions = Vec::new();

        let entries = field_delta
            .as_object()
            .into_iter()
            .flat_map(|map| map.iter())
            .filter(|(key, _)| key.as_str() != ARRAY_MARKER);

        for (key, entry) in entries {
            match ArrayDelta::parse(key, entry) {
                Some(ArrayDelta::AddedAt { index, value }) => {
                    if let Some(on_add) = &self.on_add {
                        additions.extend(on_add(value, index)?);
                    }
                }
                Some(ArrayDelta::RemovedAt { index, value }) => {
                    if let Some(on_remove) = &self.on_remove {
                        let old_item = before_items.get(index).unwrap_or(value);
                        removals.extend(on_remove(old_item, index)?);
                    }
                }
                Some(ArrayDelta::ChangedAt { index, delta }) => {
                    if let Some(on_change) = &self.on_change {
                        let pair = matching_pair(&positions, key, before_items, now_items);
                        changes.extend(on_change(ChangedItem {
                            index,
                            old: pair.old_obj,
                            new: now_items.get(index),
                            delta,
                        })?);
                    }
                }
                Some(ArrayDelta::MovedFrom {
                    old_index,
                    new_index,
                    ..
                }) => {
                    if let Some(on_move) = &self.on_move {
                        moves.extend(on_move(MovedItem {
                            old_index,
                            new_index,
                            old: before_items.get(old_index),
                            new: now_items.get(new_index),
                        })?);
                    }
                }
                None => {}
            }
        }

        let mut commands = removals;
        commands.append(&mut changes);
        commands.append(&mut moves);
        commands.append(&mut additions);
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsync_diff::diff;
    use serde_json::json;

    fn mapper<'a>() -> ArrayMapper<'a> {
        ArrayMapper::new("items")
            .on_add(|item, index| {
                Ok(vec![Command::new("addItem")
                    .with("item", item.clone())
                    .with("position", json!(index))])
            })
            .on_remove(|item, _| {
                Ok(vec![
                    Command::new("removeItem").with("id", item.get("id").cloned().unwrap_or_default())
                ])
            })
            .on_change(|changed| {
                Ok(vec![Command::new("changeItem")
                    .with("id", changed.new.and_then(|i| i.get("id")).cloned().unwrap_or_default())
                    .with("delta", changed.delta.clone())])
            })
    }

    #[test]
    fn no_field_delta_no_commands() {
        let before = json!({"items": [{"id": "a"}]});
        let now = json!({"items": [{"id": "a"}], "key": "k2"});
        let delta = diff(&json!({"items": [{"id": "a"}], "key": "k1"}), &now).unwrap();
        let commands = mapper().build(&delta, &before, &now).unwrap();
        assert!(commands.is_empty());
    }

    #[test]
    fn added_item_dispatches_with_position() {
        let before = json!({"items": [{"id": "a"}]});
        let now = json!({"items": [{"id": "a"}, {"id": "b"}]});
        let delta = diff(&before, &now).unwrap();

        let commands = mapper().build(&delta, &before, &now).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            serde_json::to_value(&commands[0]).unwrap(),
            json!({"command": "addItem", "item": {"id": "b"}, "position": 1})
        );
    }

    #[test]
    fn removals_precede_additions() {
        let before = json!({"items": [{"id": "a"}, {"id": "b"}]});
        let now = json!({"items": [{"id": "a"}, {"id": "c"}]});
        let delta = diff(&before, &now).unwrap();

        let commands = mapper().build(&delta, &before, &now).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].command, "removeItem");
        assert_eq!(commands[0].field("id"), Some(&json!("b")));
        assert_eq!(commands[1].command, "addItem");
    }

    #[test]
    fn change_resolves_old_item_across_reorder() {
        let before = json!({"items": [{"id": "a", "v": 1}, {"id": "b"}]});
        let now = json!({"items": [{"id": "b"}, {"id": "a", "v": 2}]});
        let delta = diff(&before, &now).unwrap();

        let seen = std::cell::RefCell::new(Vec::new());
        {
            let mapper = ArrayMapper::new("items").on_change(|changed| {
                seen.borrow_mut()
                    .push((changed.old.cloned(), changed.new.cloned()));
                Ok(Vec::new())
            });
            mapper.build(&delta, &before, &now).unwrap();
        }

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 1);
        // identity "a": old item resolved despite sitting at a different index
        assert_eq!(seen[0].0, Some(json!({"id": "a", "v": 1})));
        assert_eq!(seen[0].1, Some(json!({"id": "a", "v": 2})));
    }

    #[test]
    fn pure_move_without_callback_is_silent() {
        let before = json!({"items": [{"id": "a"}, {"id": "b"}]});
        let now = json!({"items": [{"id": "b"}, {"id": "a"}]});
        let delta = diff(&before, &now).unwrap();

        let commands = mapper().build(&delta, &before, &now).unwrap();
        assert!(commands.is_empty());
    }

    #[test]
    fn move_callback_receives_both_positions() {
        let before = json!({"items": [{"id": "a"}, {"id": "b"}]});
        let now = json!({"items": [{"id": "b"}, {"id": "a"}]});
        let delta = diff(&before, &now).unwrap();

        let mapper = ArrayMapper::new("items").on_move(|moved| {
            Ok(vec![Command::new("moveItem")
                .with("from", json!(moved.old_index))
                .with("to", json!(moved.new_index))])
        });
        let commands = mapper.build(&delta, &before, &now).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].field("from"), Some(&json!(0)));
        assert_eq!(commands[0].field("to"), Some(&json!(1)));
    }

    #[test]
    fn whole_field_tuple_is_ignored() {
        let before = json!({});
        let now = json!({"items": [{"id": "a"}]});
        let delta = diff(&before, &now).unwrap();

        // delta.items is `[newArray]`, not a positional array delta
        let commands = mapper().build(&delta, &before, &now).unwrap();
        assert!(commands.is_empty());
    }
}
