//! Resolution of type-tagged custom field bags.
//!
//! A custom bag is a dynamic `{"type": <reference>, "fields": {..}}` pair.
//! Its delta resolves to exactly one of three shapes, tested in priority
//! order: the whole bag replaced as a unit, the type reference changed, or
//! individual field values changed. The cases never mix; the only
//! no-command path is a bag absent on both sides.

use recsync_types::Command;
use serde_json::{Map, Value};

use recsync_diff::delta_value;

/// Command-name pair for one custom-bag site.
///
/// Nested bags on collection items reuse the mapper with prefixed names
/// (e.g. `setAssetCustomType` / `setAssetCustomField`).
#[derive(Clone, Copy, Debug)]
pub struct CustomFieldCommands {
    /// Emitted when the bag or its type changes.
    pub set_type: &'static str,
    /// Emitted once per changed field value.
    pub set_field: &'static str,
}

impl Default for CustomFieldCommands {
    fn default() -> Self {
        Self {
            set_type: "setCustomType",
            set_field: "setCustomField",
        }
    }
}

/// Build the commands for a changed custom bag.
///
/// `extra` is spread into every emitted command; call sites use it to attach
/// contextual identifiers (a price id, an asset id) when the bag lives on a
/// collection item rather than the record root.
pub fn build_custom_field_actions(
    delta: &Value,
    now: &Value,
    _before: &Value,
    commands: &CustomFieldCommands,
    extra: &Map<String, Value>,
) -> Vec<Command> {
    let Some(custom_delta) = delta.get("custom") else {
        return Vec::new();
    };

    // Case 1: the whole bag changed as one unit.
    if custom_delta.is_array() {
        let mut command = Command::new(commands.set_type).with_object(extra);
        if let Some(bag) = delta_value(custom_delta).and_then(Value::as_object) {
            command = command.with_object(bag);
        }
        return vec![command];
    }

    // Case 2: the type reference changed.
    if let Some(type_delta) = custom_delta.get("type") {
        return build_type_change(custom_delta, type_delta, now, commands, extra);
    }

    // Case 3: individual field values changed.
    if let Some(fields_delta) = custom_delta.get("fields").and_then(Value::as_object) {
        let now_fields = now.pointer("/custom/fields");
        return fields_delta
            .keys()
            .map(|name| {
                let mut command = Command::new(commands.set_field)
                    .with_object(extra)
                    .with("name", Value::String(name.clone()));
                if let Some(value) = now_fields.and_then(|fields| fields.get(name)) {
                    command = command.with("value", value.clone());
                }
                command
            })
            .collect();
    }

    Vec::new()
}

fn build_type_change(
    custom_delta: &Value,
    type_delta: &Value,
    now: &Value,
    commands: &CustomFieldCommands,
    extra: &Map<String, Value>,
) -> Vec<Command> {
    // Either the new type value (whole-reference tuple) or the nested delta
    // of the reference; both carry the discriminating `id`/`key` entry.
    let resolved = if type_delta.is_array() {
        delta_value(type_delta)
    } else {
        Some(type_delta)
    };

    let Some(resolved) = resolved.filter(|value| !value.is_null()) else {
        // Type removed or cleared: a bare set-type command unsets the bag.
        return vec![Command::new(commands.set_type).with_object(extra)];
    };

    let now_type = now.pointer("/custom/type");

    let identity = if resolved.get("id").is_some() {
        resolve_identity(resolved.get("id"), now_type, "id").map(|value| ("id", value))
    } else if resolved.get("key").is_some() {
        resolve_identity(resolved.get("key"), now_type, "key").map(|value| ("key", value))
    } else {
        None
    };

    let Some((identity_kind, identity_value)) = identity else {
        return Vec::new();
    };

    let mut type_stub = Map::new();
    type_stub.insert("typeId".to_string(), Value::String("type".to_string()));
    type_stub.insert(identity_kind.to_string(), identity_value);

    let mut command = Command::new(commands.set_type)
        .with_object(extra)
        .with("type", Value::Object(type_stub));

    // The field map travels whole: the remote side replaces all fields when
    // the type changes.
    let fields = match custom_delta.get("fields") {
        Some(fields_delta) if fields_delta.is_array() => delta_value(fields_delta).cloned(),
        _ => now.pointer("/custom/fields").cloned(),
    };
    if let Some(fields) = fields {
        command = command.with("fields", fields);
    }

    vec![command]
}

/// The new identity: from the delta tuple when the attribute itself was
/// diffed, otherwise from the after record.
fn resolve_identity(
    attribute_delta: Option<&Value>,
    now_type: Option<&Value>,
    kind: &str,
) -> Option<Value> {
    match attribute_delta {
        Some(value) if value.is_array() => delta_value(value).cloned(),
        _ => now_type.and_then(|ty| ty.get(kind)).cloned(),
    }
}
