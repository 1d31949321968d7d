//! The build-actions entry point.
//!
//! [`ActionBuilder`] wires the pieces into the one public operation a record
//! type exposes: validate inputs, run the optional pre-diff transform, diff,
//! short-circuit on an empty delta, then hand the delta to the record type's
//! mapper with the group filter.

use recsync_types::{Command, SyncOptions};
use serde_json::{Map, Value};
use tracing::debug;

use recsync_diff::{diff_with, DiffOptions};

use crate::error::{SyncError, SyncResult};
use crate::groups::GroupFilter;

type PreDiffFn = Box<dyn Fn(&Value, &Value) -> (Value, Value) + Send + Sync>;
type MapActionsFn = Box<
    dyn Fn(&Value, &Value, &Value, &SyncOptions, &GroupFilter) -> SyncResult<Vec<Command>>
        + Send
        + Sync,
>;

/// Builder-factory for one record type's `build_actions` operation.
///
/// The mapper receives `(delta, now, before, options, filter)`, with the two
/// records as seen by the differ (post pre-diff transform), and returns the
/// flattened command list.
pub struct ActionBuilder {
    map_actions: MapActionsFn,
    on_before_diff: Option<PreDiffFn>,
    diff_options: DiffOptions,
}

impl ActionBuilder {
    /// Create a builder around a record type's mapper.
    pub fn new<F>(map_actions: F) -> Self
    where
        F: Fn(&Value, &Value, &Value, &SyncOptions, &GroupFilter) -> SyncResult<Vec<Command>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            map_actions: Box::new(map_actions),
            on_before_diff: None,
            diff_options: DiffOptions::default(),
        }
    }

    /// Install a pre-diff transform applied to `(before, now)`.
    ///
    /// Used e.g. to splice a conceptually-singular primary item back into its
    /// collection so the generic array machinery sees one uniform list.
    pub fn on_before_diff<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Value, &Value) -> (Value, Value) + Send + Sync + 'static,
    {
        self.on_before_diff = Some(Box::new(transform));
        self
    }

    /// Override the differ configuration.
    pub fn diff_options(mut self, options: DiffOptions) -> Self {
        self.diff_options = options;
        self
    }

    /// Build the update commands turning `before` into `now`.
    ///
    /// The single input validation the engine performs: both records must be
    /// present (non-null). An empty delta returns an empty list without
    /// invoking any mapper, unless `options.always_map` is set.
    pub fn build_actions(
        &self,
        now: &Value,
        before: &Value,
        options: &SyncOptions,
    ) -> SyncResult<Vec<Command>> {
        if now.is_null() || before.is_null() {
            return Err(SyncError::MissingRecord);
        }

        let (processed_before, processed_now) = match &self.on_before_diff {
            Some(transform) => transform(before, now),
            None => (before.clone(), now.clone()),
        };

        let delta = match diff_with(&processed_before, &processed_now, &self.diff_options) {
            Some(delta) => delta,
            None if options.always_map => Value::Object(Map::new()),
            None => {
                debug!("records are structurally equal; no actions");
                return Ok(Vec::new());
            }
        };

        let filter = GroupFilter::from_options(options);
        let commands =
            (self.map_actions)(&delta, &processed_now, &processed_before, options, &filter)?;
        debug!(count = commands.len(), "update actions built");
        Ok(commands)
    }
}
