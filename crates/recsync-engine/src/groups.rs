//! Named action-group filtering.
//!
//! A record type's orchestrator wraps every mapper in a named group; callers
//! switch whole groups off by name without touching the mapper wiring.
//! Ignored producers are never invoked, so expensive mappers cost nothing
//! when filtered out.

use std::collections::BTreeMap;

use recsync_types::{ActionGroup, Command, GroupMode, SyncOptions};

use crate::error::SyncResult;

/// Allow/ignore dispatch for named action groups.
///
/// Names absent from the configured list are allowed.
#[derive(Clone, Debug, Default)]
pub struct GroupFilter {
    modes: BTreeMap<String, GroupMode>,
}

impl GroupFilter {
    /// Build a filter from an explicit group list.
    pub fn new(groups: &[ActionGroup]) -> Self {
        Self {
            modes: groups
                .iter()
                .map(|group| (group.name.clone(), group.mode))
                .collect(),
        }
    }

    /// Build a filter from the invocation options.
    pub fn from_options(options: &SyncOptions) -> Self {
        Self::new(&options.action_groups)
    }

    /// Whether `name` is explicitly ignored.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.modes.get(name) == Some(&GroupMode::Ignore)
    }

    /// Run `producer` unless `name` is ignored.
    ///
    /// Ignored groups short-circuit to an empty list without invoking the
    /// producer.
    pub fn map_group<F>(&self, name: &str, producer: F) -> SyncResult<Vec<Command>>
    where
        F: FnOnce() -> SyncResult<Vec<Command>>,
    {
        if self.is_ignored(name) {
            tracing::trace!(group = name, "action group ignored");
            return Ok(Vec::new());
        }
        producer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsync_types::Command;

    #[test]
    fn unlisted_group_runs() {
        let filter = GroupFilter::new(&[]);
        let commands = filter
            .map_group("base", || Ok(vec![Command::new("setKey")]))
            .unwrap();
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn ignored_group_short_circuits_lazily() {
        let filter = GroupFilter::new(&[ActionGroup::new("custom", GroupMode::Ignore)]);
        let mut invoked = false;
        let commands = filter
            .map_group("custom", || {
                invoked = true;
                Ok(vec![Command::new("setCustomType")])
            })
            .unwrap();
        assert!(commands.is_empty());
        assert!(!invoked, "ignored producers must never run");
    }

    #[test]
    fn allow_entry_is_explicit_no_op() {
        let filter = GroupFilter::new(&[ActionGroup::new("base", GroupMode::Allow)]);
        let commands = filter
            .map_group("base", || Ok(vec![Command::new("setKey")]))
            .unwrap();
        assert_eq!(commands.len(), 1);
    }
}
