//! Catalog entity synchronization.
//!
//! Applies the generic recsync engine to concrete catalog record types.
//! Currently covers the listing family; further record types are thin,
//! mechanical applications of the same tables-plus-groups pattern.
//!
//! # Key Types
//!
//! - [`ListingSync`] — build update commands for catalog listings
//! - [`listing::ACTION_GROUPS`] — the named mapper groups, in run order

pub mod listing;
pub mod listing_actions;

pub use listing::{build_actions, ListingSync, ACTION_GROUPS};
