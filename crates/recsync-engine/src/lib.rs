//! Generic command synthesis machinery for recsync.
//!
//! Turns a structural delta (computed by `recsync-diff`) into a list of
//! discrete update commands, via table-driven field mappers, an
//! identity-reconciled array-element dispatcher, and a filtered action-group
//! orchestration layer. Everything here is pure and synchronous: no I/O, no
//! shared mutable state, no dependence on anything beyond the two input
//! trees and the options.
//!
//! # Key Types
//!
//! - [`ActionBuilder`] — validate, pre-diff transform, diff, dispatch
//! - [`build_position_map`] / [`matching_pair`] — array identity reconciler
//! - [`FieldAction`] + [`build_base_field_actions`] /
//!   [`build_reference_field_actions`] — table-driven field mappers
//! - [`ArrayMapper`] — ADD/REMOVE/CHANGE/MOVE dispatch for ordered fields
//! - [`build_custom_field_actions`] — type-tagged custom bag resolution
//! - [`GroupFilter`] — lazy allow/ignore per named action group
//! - [`SyncError`] / [`SyncResult`] — engine failures

pub mod arrays;
pub mod attributes;
pub mod build;
pub mod custom;
pub mod error;
pub mod groups;
pub mod normalize;
pub mod pairs;

pub use arrays::{ArrayMapper, ChangedItem, MovedItem};
pub use attributes::{build_base_field_actions, build_reference_field_actions, FieldAction};
pub use build::ActionBuilder;
pub use custom::{build_custom_field_actions, CustomFieldCommands};
pub use error::{SyncError, SyncResult};
pub use groups::GroupFilter;
pub use normalize::copy_empty_array_props;
pub use pairs::{build_position_map, matching_pair, MatchedPair, PositionMap, PositionPair};
