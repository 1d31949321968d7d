//! Error types for the delta applier.
//!
//! The differ itself is total and never fails; only [`crate::patch`] can
//! reject its input.

/// Errors that can occur while applying a delta.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// The delta refers to an object key missing from the target.
    #[error("missing key in patch target: {0}")]
    MissingKey(String),

    /// The delta refers to an array index out of range of the target.
    #[error("index out of range in patch target: {0}")]
    IndexOutOfRange(usize),

    /// The delta and the target disagree about the shape at some path.
    #[error("patch target mismatch: expected {expected}")]
    TargetMismatch { expected: &'static str },

    /// The delta is not well-formed positional encoding.
    #[error("malformed delta entry: {0}")]
    MalformedDelta(String),
}

/// Convenience alias for applier results.
pub type PatchResult<T> = Result<T, PatchError>;
