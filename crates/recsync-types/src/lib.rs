//! Foundation types for recsync.
//!
//! This crate provides the command and configuration types used throughout
//! the recsync system. Every other recsync crate depends on `recsync-types`.
//!
//! # Key Types
//!
//! - [`Command`] — One discrete update command in the output list
//! - [`SyncOptions`] — Policy flags and group filter for one sync invocation
//! - [`ActionGroup`] / [`GroupMode`] — Per-group allow/ignore configuration

pub mod command;
pub mod config;

pub use command::Command;
pub use config::{ActionGroup, GroupMode, SyncOptions};
