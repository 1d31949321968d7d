//! Listing synchronization: group wiring and the public entry point.
//!
//! Composes the per-group mappers in a fixed order behind the generic
//! [`ActionBuilder`]: normalize, diff, filter groups, concatenate, then
//! apply the publish post-pass.

use recsync_types::{Command, SyncOptions};
use serde_json::Value;

use recsync_engine::{copy_empty_array_props, ActionBuilder, GroupFilter, SyncResult};

use crate::listing_actions;

/// The named mapper groups, in run order.
pub const ACTION_GROUPS: &[&str] = &["base", "meta", "references", "custom", "assets"];

/// Builds update commands for catalog listings.
///
/// Construct once per configuration and reuse freely: invocations are pure
/// and independent.
pub struct ListingSync {
    builder: ActionBuilder,
    options: SyncOptions,
}

impl ListingSync {
    /// A listing sync with the given options.
    pub fn new(options: SyncOptions) -> Self {
        let builder = ActionBuilder::new(map_listing_actions).on_before_diff(normalize_listing);
        Self { builder, options }
    }

    /// Build the commands turning `before` into `now`.
    pub fn build_actions(&self, now: &Value, before: &Value) -> SyncResult<Vec<Command>> {
        self.builder.build_actions(now, before, &self.options)
    }
}

impl Default for ListingSync {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

/// One-shot form of [`ListingSync::build_actions`].
pub fn build_actions(
    now: &Value,
    before: &Value,
    options: &SyncOptions,
) -> SyncResult<Vec<Command>> {
    ListingSync::new(options.clone()).build_actions(now, before)
}

fn map_listing_actions(
    delta: &Value,
    now: &Value,
    before: &Value,
    options: &SyncOptions,
    filter: &GroupFilter,
) -> SyncResult<Vec<Command>> {
    let mut commands = Vec::new();

    commands.extend(filter.map_group("base", || {
        Ok(listing_actions::map_base(delta, before, now, options))
    })?);
    commands.extend(filter.map_group("meta", || {
        Ok(listing_actions::map_meta(delta, before, now, options))
    })?);
    commands.extend(filter.map_group("references", || {
        Ok(listing_actions::map_references(delta, before, now))
    })?);
    commands.extend(filter.map_group("custom", || {
        Ok(listing_actions::map_custom(delta, now, before))
    })?);
    commands.extend(filter.map_group("assets", || {
        listing_actions::map_assets(delta, before, now, &options.identity_key)
    })?);

    if is_publish_transition(now) {
        commands = commands
            .into_iter()
            .map(|command| command.with("staged", Value::Bool(false)))
            .collect();
    }

    tracing::debug!(count = commands.len(), "listing actions mapped");
    Ok(commands)
}

/// Publishing (or explicitly leaving staged mode) applies every command to
/// the live projection.
fn is_publish_transition(now: &Value) -> bool {
    now.get("publish").and_then(Value::as_bool) == Some(true)
        || now.get("staged").and_then(Value::as_bool) == Some(false)
}

/// Pre-diff normalization: materialize missing array fields, then splice the
/// primary asset into the asset collection so the array machinery sees one
/// uniform list on both sides.
fn normalize_listing(before: &Value, now: &Value) -> (Value, Value) {
    let (mut before, mut now) = copy_empty_array_props(before, now);
    splice_primary_asset(&mut before);
    splice_primary_asset(&mut now);
    (before, now)
}

fn splice_primary_asset(record: &mut Value) {
    let Some(map) = record.as_object_mut() else {
        return;
    };
    let Some(primary) = map.remove("primaryAsset") else {
        return;
    };
    let mut assets = vec![primary];
    if let Some(Value::Array(rest)) = map.remove("assets") {
        assets.extend(rest);
    }
    map.insert("assets".to_string(), Value::Array(assets));
}
