//! Error types for evaluation and digestion.

use thiserror::Error;
use trellis_vine::ExprError;

/// Errors surfaced by the string-accepting evaluation entry points.
///
/// Missing properties are not errors: evaluating a path that resolves
/// nowhere yields `Value::Undefined`. Only malformed source text and
/// non-assignable assignment targets are reported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Malformed expression syntax.
    #[error("expression syntax: {0}")]
    Syntax(#[from] ExprError),

    /// `assign` requires a plain property path; call forms have no
    /// storage location.
    #[error("`{expr}` is not assignable: only plain property paths can be assigned")]
    NotAssignable { expr: String },
}

/// Errors surfaced by the digest loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The watcher set did not stabilize within the iteration cap.
    /// `watchers` holds the display forms of the expressions that were
    /// still changing in the final traversal.
    #[error("digest did not stabilize after {limit} traversals; still changing: {watchers:?}")]
    LimitExceeded {
        limit: usize,
        watchers: Vec<String>,
    },

    /// A digest was requested while one is already running on this tree.
    /// The caller must let the in-progress digest finish and retry.
    #[error("digest already in progress on this scope tree")]
    InProgress,
}
