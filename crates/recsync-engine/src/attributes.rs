//! Table-driven field mappers.
//!
//! Most record fields map one-to-one onto a single-field command. A record
//! type declares a static table of [`FieldAction`] rows; the builders below
//! walk the table against the delta and emit one command per row whose field
//! actually changed. Reference-shaped fields get their own builder because
//! the emitted value is a typed reference stub, not the raw field value.

use recsync_types::{Command, SyncOptions};
use serde_json::{json, Value};

use recsync_diff::ScalarDelta;

/// One declarative row: which field feeds which command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldAction {
    /// The command name to emit.
    pub command: &'static str,
    /// The record field the command reads from.
    pub field: &'static str,
    /// The key the value is emitted under; defaults to `field`.
    pub command_field: Option<&'static str>,
    /// Remotely required: the prevent-unsetting policy protects this row.
    pub required: bool,
}

impl FieldAction {
    /// A row emitting the value under the field's own name.
    pub const fn new(command: &'static str, field: &'static str) -> Self {
        Self {
            command,
            field,
            command_field: None,
            required: false,
        }
    }

    /// A row emitting the value under a different key.
    pub const fn renamed(
        command: &'static str,
        field: &'static str,
        command_field: &'static str,
    ) -> Self {
        Self {
            command,
            field,
            command_field: Some(command_field),
            required: false,
        }
    }

    /// Flag this row as remotely required.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn value_key(&self) -> &'static str {
        self.command_field.unwrap_or(self.field)
    }
}

/// Build one command per table row whose field has a delta entry.
///
/// The command value is always the full new value from `now`, so partial
/// nested deltas (a single language of a localized string, one key of a
/// nested object) emit the complete post-change value. A removal delta is an
/// omission: skipped by default, emitted as a value-less clear command when
/// `unset_omitted_properties` is set, and suppressed again for `required`
/// rows when `prevent_unsetting_required_fields` is set.
pub fn build_base_field_actions(
    table: &[FieldAction],
    delta: &Value,
    _before: &Value,
    now: &Value,
    options: &SyncOptions,
) -> Vec<Command> {
    let mut commands = Vec::new();

    for row in table {
        let Some(entry) = delta.get(row.field) else {
            continue;
        };

        let removed = matches!(ScalarDelta::parse(entry), Some(ScalarDelta::Removed(_)));
        if removed {
            if !options.unset_omitted_properties {
                continue;
            }
            if options.prevent_unsetting_required_fields && row.required {
                continue;
            }
            commands.push(Command::new(row.command));
            continue;
        }

        let Some(value) = now.get(row.field) else {
            continue;
        };
        if options.omit_empty_string && value.as_str() == Some("") {
            continue;
        }
        commands.push(Command::new(row.command).with(row.value_key(), value.clone()));
    }

    commands
}

/// Build one command per reference-shaped table row with a delta entry.
///
/// The emitted value is a typed reference stub: `{"typeId", "id"}` when the
/// new reference carries an id, `{"typeId", "key"}` otherwise. Rows whose
/// old and new references resolve to the same identity are skipped even when
/// the delta is non-empty: denormalized reference expansions diff noisily
/// without the identity actually changing. A reference absent from `now`
/// emits a value-less clear command.
pub fn build_reference_field_actions(
    table: &[FieldAction],
    delta: &Value,
    before: &Value,
    now: &Value,
) -> Vec<Command> {
    let mut commands = Vec::new();

    for row in table {
        if delta.get(row.field).is_none() {
            continue;
        }

        let old_ref = before.get(row.field);
        let new_ref = now.get(row.field);

        if let (Some(old), Some(new)) = (old_ref, new_ref) {
            let same_identity = old.get("typeId") == new.get("typeId")
                && old.get("id") == new.get("id")
                && new.get("id").is_some();
            if same_identity {
                continue;
            }
        }

        match new_ref {
            Some(reference) => {
                let type_id = reference.get("typeId").cloned().unwrap_or(Value::Null);
                let stub = if let Some(id) = reference.get("id") {
                    json!({"typeId": type_id, "id": id})
                } else if let Some(key) = reference.get("key") {
                    json!({"typeId": type_id, "key": key})
                } else {
                    // A reference with no identity cannot be expressed
                    // remotely; treat as a clear.
                    Value::Null
                };
                let command = if stub.is_null() {
                    Command::new(row.command)
                } else {
                    Command::new(row.command).with(row.value_key(), stub)
                };
                commands.push(command);
            }
            None => commands.push(Command::new(row.command)),
        }
    }

    commands
}
