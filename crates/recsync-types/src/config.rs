//! Sync configuration: policy flags and the action-group filter list.

use serde::{Deserialize, Serialize};

/// Whether a named action group runs or is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// The group's mapper runs (the default for unlisted groups).
    Allow,
    /// The group's mapper is skipped without being invoked.
    Ignore,
}

/// Filter entry for one named action group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGroup {
    /// Group name, e.g. `base` or `custom`.
    pub name: String,
    /// Allow or ignore.
    pub mode: GroupMode,
}

impl ActionGroup {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, mode: GroupMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }
}

/// Options for one sync invocation.
///
/// All flags default to off; the identity key defaults to `id`. The options
/// are plain data, safe to share across threads and invocations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Skip emitting a command when the new value is an empty string.
    pub omit_empty_string: bool,
    /// When a field present before is entirely absent after, emit an explicit
    /// clear command. Off by default: omissions are treated as "not touched".
    pub unset_omitted_properties: bool,
    /// Suppress the explicit clear above for fields flagged as required.
    pub prevent_unsetting_required_fields: bool,
    /// Attribute used to re-pair ordered-collection elements across
    /// before/after despite reordering.
    pub identity_key: String,
    /// Allow/ignore filter, keyed by group name. Unlisted groups are allowed.
    pub action_groups: Vec<ActionGroup>,
    /// Run the mappers even when the diff is empty.
    pub always_map: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            omit_empty_string: false,
            unset_omitted_properties: false,
            prevent_unsetting_required_fields: false,
            identity_key: "id".to_string(),
            action_groups: Vec::new(),
            always_map: false,
        }
    }
}

impl SyncOptions {
    /// Look up the configured mode for a group name.
    ///
    /// Unlisted names are `Allow`.
    pub fn group_mode(&self, name: &str) -> GroupMode {
        self.action_groups
            .iter()
            .find(|group| group.name == name)
            .map(|group| group.mode)
            .unwrap_or(GroupMode::Allow)
    }
}
