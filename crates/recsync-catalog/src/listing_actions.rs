//! Per-group mappers for the listing record family.
//!
//! The scalar groups are declarative tables over the generic field builders;
//! the asset group wires the element-wise array dispatcher with
//! listing-specific callbacks.

use recsync_types::{Command, SyncOptions};
use serde_json::{json, Map, Value};

use recsync_engine::{
    build_base_field_actions, build_custom_field_actions, build_reference_field_actions,
    ArrayMapper, CustomFieldCommands, FieldAction, SyncError, SyncResult,
};

/// Scalar fields, one command each. `slug` is remotely required.
pub const BASE_FIELD_ACTIONS: &[FieldAction] = &[
    FieldAction::new("setKey", "key"),
    FieldAction::new("changeName", "name"),
    FieldAction::new("changeSlug", "slug").required(),
    FieldAction::new("setDescription", "description"),
    FieldAction::new("setRoles", "roles"),
];

/// Search metadata fields.
pub const META_FIELD_ACTIONS: &[FieldAction] = &[
    FieldAction::new("setMetaTitle", "metaTitle"),
    FieldAction::new("setMetaDescription", "metaDescription"),
    FieldAction::new("setMetaKeywords", "metaKeywords"),
];

/// Reference fields, emitted as typed stubs.
pub const REFERENCE_FIELD_ACTIONS: &[FieldAction] = &[FieldAction::new("changeParent", "parent")];

/// Base scalar commands.
pub fn map_base(
    delta: &Value,
    before: &Value,
    now: &Value,
    options: &SyncOptions,
) -> Vec<Command> {
    build_base_field_actions(BASE_FIELD_ACTIONS, delta, before, now, options)
}

/// Search metadata commands.
pub fn map_meta(
    delta: &Value,
    before: &Value,
    now: &Value,
    options: &SyncOptions,
) -> Vec<Command> {
    build_base_field_actions(META_FIELD_ACTIONS, delta, before, now, options)
}

/// Reference commands.
pub fn map_references(delta: &Value, before: &Value, now: &Value) -> Vec<Command> {
    build_reference_field_actions(REFERENCE_FIELD_ACTIONS, delta, before, now)
}

/// Custom-bag commands on the listing root.
pub fn map_custom(delta: &Value, now: &Value, before: &Value) -> Vec<Command> {
    build_custom_field_actions(
        delta,
        now,
        before,
        &CustomFieldCommands::default(),
        &Map::new(),
    )
}

/// Asset collection commands.
///
/// Adds and removes map one-to-one. An in-place change is a composite
/// remove-then-add (the remote API has no atomic asset replace), so nested
/// asset edits (custom bag included) travel inside the re-added value.
/// Moves collapse into a single `changeAssetOrder` command carrying the kept
/// ids in after-order followed by the removed ids; repeated move entries
/// de-duplicate to that one command. A moved asset whose content also changed
/// takes the composite path and still feeds the order command.
pub fn map_assets(
    delta: &Value,
    before: &Value,
    now: &Value,
    identity_key: &str,
) -> SyncResult<Vec<Command>> {
    let no_items = Vec::new();
    let before_assets = before
        .get("assets")
        .and_then(Value::as_array)
        .unwrap_or(&no_items);
    let now_assets = now
        .get("assets")
        .and_then(Value::as_array)
        .unwrap_or(&no_items);

    let mapper = ArrayMapper::new("assets")
        .identity_key(identity_key)
        .on_add(|asset, position| {
            Ok(vec![Command::new("addAsset")
                .with("asset", asset.clone())
                .with("position", json!(position))])
        })
        .on_remove(|asset, _| {
            let (kind, identifier) = asset_identifier(asset)?;
            Ok(vec![Command::new("removeAsset").with(kind, identifier)])
        })
        .on_change(|changed| {
            let mut commands = Vec::new();
            if let Some(old_asset) = changed.old {
                let (kind, identifier) = asset_identifier(old_asset)?;
                commands.push(Command::new("removeAsset").with(kind, identifier));
            }
            if let Some(new_asset) = changed.new {
                commands.push(Command::new("addAsset").with("asset", new_asset.clone()));
            }
            Ok(commands)
        })
        .on_move(|_| Ok(vec![asset_order_command(before_assets, now_assets)]));

    let commands = mapper.build(delta, before, now)?;
    Ok(dedup_identical(commands))
}

/// The full-order command for a reordered asset collection: ids still
/// present, in after-order, then ids that are on their way out.
fn asset_order_command(before_assets: &[Value], now_assets: &[Value]) -> Command {
    let before_ids: Vec<&Value> = before_assets.iter().filter_map(|a| a.get("id")).collect();
    let kept: Vec<&Value> = now_assets
        .iter()
        .filter_map(|asset| asset.get("id"))
        .filter(|id| !id.is_null() && before_ids.contains(id))
        .collect();
    let removed: Vec<&Value> = before_ids
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    let order: Vec<Value> = kept.into_iter().chain(removed).cloned().collect();
    Command::new("changeAssetOrder").with("assetOrder", Value::Array(order))
}

fn asset_identifier(asset: &Value) -> SyncResult<(&'static str, Value)> {
    if let Some(id) = asset.get("id").filter(|value| !value.is_null()) {
        Ok(("assetId", id.clone()))
    } else if let Some(key) = asset.get("key").filter(|value| !value.is_null()) {
        Ok(("assetKey", key.clone()))
    } else {
        Err(SyncError::MalformedRecord(
            "asset has neither `id` nor `key`".to_string(),
        ))
    }
}

/// Drop exact repeats while preserving first-occurrence order.
///
/// Reordering N assets yields N identical order commands; only one may ship.
fn dedup_identical(commands: Vec<Command>) -> Vec<Command> {
    let mut unique: Vec<Command> = Vec::with_capacity(commands.len());
    for command in commands {
        if !unique.contains(&command) {
            unique.push(command);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsync_diff::diff;
    use serde_json::json;

    fn assets_commands(before: Value, now: Value) -> SyncResult<Vec<Command>> {
        let delta = diff(&before, &now).expect("records differ");
        map_assets(&delta, &before, &now, "id")
    }

    #[test]
    fn added_asset_includes_position() {
        let commands = assets_commands(
            json!({"assets": [{"id": "a"}]}),
            json!({"assets": [{"id": "a"}, {"id": "b", "name": {"en": "img"}}]}),
        )
        .unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            serde_json::to_value(&commands[0]).unwrap(),
            json!({
                "command": "addAsset",
                "asset": {"id": "b", "name": {"en": "img"}},
                "position": 1,
            })
        );
    }

    #[test]
    fn removed_asset_uses_id_identifier() {
        let commands = assets_commands(
            json!({"assets": [{"id": "a"}, {"id": "b"}]}),
            json!({"assets": [{"id": "a"}]}),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&commands[0]).unwrap(),
            json!({"command": "removeAsset", "assetId": "b"})
        );
    }

    #[test]
    fn key_only_asset_uses_key_identifier() {
        let commands = assets_commands(
            json!({"assets": [{"key": "hero"}]}),
            json!({"assets": []}),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&commands[0]).unwrap(),
            json!({"command": "removeAsset", "assetKey": "hero"})
        );
    }

    #[test]
    fn changed_asset_is_remove_then_add() {
        let commands = assets_commands(
            json!({"assets": [{"id": "a", "name": {"en": "old"}}]}),
            json!({"assets": [{"id": "a", "name": {"en": "new"}}]}),
        )
        .unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            serde_json::to_value(&commands[0]).unwrap(),
            json!({"command": "removeAsset", "assetId": "a"})
        );
        assert_eq!(
            serde_json::to_value(&commands[1]).unwrap(),
            json!({"command": "addAsset", "asset": {"id": "a", "name": {"en": "new"}}})
        );
    }

    #[test]
    fn reorder_collapses_to_one_order_command() {
        let commands = assets_commands(
            json!({"assets": [{"id": "a"}, {"id": "b"}, {"id": "c"}]}),
            json!({"assets": [{"id": "c"}, {"id": "b"}, {"id": "a"}]}),
        )
        .unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            serde_json::to_value(&commands[0]).unwrap(),
            json!({"command": "changeAssetOrder", "assetOrder": ["c", "b", "a"]})
        );
    }

    #[test]
    fn reorder_with_append_adds_only_the_new_asset() {
        let commands = assets_commands(
            json!({"assets": [{"id": "a"}, {"id": "b"}]}),
            json!({"assets": [{"id": "b"}, {"id": "a"}, {"id": "c"}]}),
        )
        .unwrap();
        let adds: Vec<_> = commands.iter().filter(|c| c.command == "addAsset").collect();
        let removes: Vec<_> = commands.iter().filter(|c| c.command == "removeAsset").collect();
        assert_eq!(adds.len(), 1);
        assert_eq!(
            adds[0].field("asset"),
            Some(&json!({"id": "c"})),
            "only the appended asset is added"
        );
        assert!(removes.is_empty(), "a pure reorder never churns");
        assert!(commands.iter().any(|c| c.command == "changeAssetOrder"));
    }

    #[test]
    fn order_command_appends_removed_ids() {
        let commands = assets_commands(
            json!({"assets": [{"id": "a"}, {"id": "b"}, {"id": "c"}]}),
            json!({"assets": [{"id": "c"}, {"id": "a"}]}),
        )
        .unwrap();
        let order = commands
            .iter()
            .find(|c| c.command == "changeAssetOrder")
            .expect("order command present");
        assert_eq!(order.field("assetOrder"), Some(&json!(["c", "a", "b"])));
        assert!(commands.iter().any(|c| {
            c.command == "removeAsset" && c.field("assetId") == Some(&json!("b"))
        }));
    }

    #[test]
    fn identifierless_asset_is_a_malformed_record() {
        let result = assets_commands(
            json!({"assets": [{"sources": []}, {"id": "a"}]}),
            json!({"assets": [{"id": "a"}]}),
        );
        assert!(matches!(result, Err(SyncError::MalformedRecord(_))));
    }

    #[test]
    fn base_table_shape() {
        assert!(BASE_FIELD_ACTIONS
            .iter()
            .any(|row| row.command == "setKey" && row.field == "key"));
        assert!(BASE_FIELD_ACTIONS
            .iter()
            .any(|row| row.command == "setRoles" && row.field == "roles"));
        assert!(BASE_FIELD_ACTIONS
            .iter()
            .any(|row| row.command == "changeSlug" && row.required));
    }
}
