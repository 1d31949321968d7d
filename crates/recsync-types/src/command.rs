//! The update command type.
//!
//! A command is one discrete mutation instruction for the remote write API:
//! a command name plus command-specific fields. The engine treats commands as
//! opaque output values; it never re-interprets or merges them after
//! emission.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One discrete update command.
///
/// Serializes flat, so the wire shape is `{"command": "setKey", "key": "k2"}`
/// rather than a nested envelope.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// The command name, e.g. `setKey` or `removeAsset`.
    pub command: String,
    /// Command-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Command {
    /// Create a command with no fields.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            fields: Map::new(),
        }
    }

    /// Add a single field.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Spread every entry of `object` into the command's fields.
    ///
    /// Later entries overwrite earlier ones with the same key, matching the
    /// object-spread semantics the command shapes were designed around.
    pub fn with_object(mut self, object: &Map<String, Value>) -> Self {
        for (key, value) in object {
            self.fields.insert(key.clone(), value.clone());
        }
        self
    }

    /// Insert every entry of `extra` that is not already present.
    ///
    /// Used to attach contextual identifiers (variant ids, price ids) to
    /// commands produced by a shared mapper without clobbering what the
    /// mapper itself emitted.
    pub fn merge_missing(mut self, extra: &Map<String, Value>) -> Self {
        for (key, value) in extra {
            self.fields.entry(key.clone()).or_insert_with(|| value.clone());
        }
        self
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({}", self.command)?;
        for (key, value) in &self.fields {
            write!(f, ", {key}: {value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_flat() {
        let command = Command::new("setKey").with("key", json!("k2"));
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value, json!({"command": "setKey", "key": "k2"}));
    }

    #[test]
    fn deserializes_flat() {
        let command: Command =
            serde_json::from_value(json!({"command": "setRoles", "roles": ["A", "B"]})).unwrap();
        assert_eq!(command.command, "setRoles");
        assert_eq!(command.field("roles"), Some(&json!(["A", "B"])));
    }

    #[test]
    fn with_object_spreads_entries() {
        let bag = json!({"type": {"typeId": "type", "id": "t1"}, "fields": {"a": 1}});
        let command = Command::new("setCustomType")
            .with_object(bag.as_object().unwrap());
        assert_eq!(command.field("type"), Some(&json!({"typeId": "type", "id": "t1"})));
        assert_eq!(command.field("fields"), Some(&json!({"a": 1})));
    }

    #[test]
    fn merge_missing_keeps_existing() {
        let extra = json!({"variantId": 1, "name": "clobbered"});
        let command = Command::new("setAttribute")
            .with("name", json!("color"))
            .merge_missing(extra.as_object().unwrap());
        assert_eq!(command.field("name"), Some(&json!("color")));
        assert_eq!(command.field("variantId"), Some(&json!(1)));
    }
}
