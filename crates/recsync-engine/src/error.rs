//! Error types for the synthesis engine.
//!
//! The taxonomy is intentionally narrow: the engine is pure and total over
//! well-formed input. Unresolvable identities, empty deltas, and partial
//! records all produce (possibly empty) command lists, never errors.

/// Errors that can occur while building update actions.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// `build_actions` was invoked without one of the two records.
    #[error("missing `now` or `before` record to build update actions")]
    MissingRecord,

    /// A record violated a domain invariant a mapper relies on.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

/// Convenience alias for engine results.
pub type SyncResult<T> = Result<T, SyncError>;
