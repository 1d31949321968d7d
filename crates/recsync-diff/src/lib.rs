//! Structural diff engine for recsync.
//!
//! Computes a compact positional delta between two JSON-like value trees and
//! provides the typed parse layer over delta entries that the rest of the
//! system consumes. The encoding is shared with pre-existing stored deltas,
//! so it is reproduced exactly:
//!
//! - scalar added: `[newValue]`
//! - scalar changed: `[oldValue, newValue]`
//! - scalar removed: `[oldValue, 0, 0]`
//! - array deltas carry the marker entry `"_t": "a"`; their keys are
//!   after-indices (`"2"`) for additions and in-place changes, and
//!   underscore-prefixed before-indices (`"_2"`) for removals and moves
//!   (`[oldItem, newIndex, 3]`)
//!
//! # Key Types
//!
//! - [`diff`] / [`diff_with`] / [`DiffOptions`] — delta computation
//! - [`ScalarDelta`] / [`ArrayDelta`] — typed views over delta entries
//! - [`patch`] — applies a delta back onto a value
//! - [`PatchError`] / [`PatchResult`] — applier failures

pub mod delta;
pub mod differ;
pub mod error;
pub mod patch;

pub use delta::{
    delta_value, is_array_delta, ArrayDelta, ScalarDelta, ARRAY_MARKER, ARRAY_MARKER_VALUE,
};
pub use differ::{diff, diff_with, DiffOptions};
pub use error::{PatchError, PatchResult};
pub use patch::patch;
