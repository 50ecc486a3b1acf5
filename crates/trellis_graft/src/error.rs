//! Error types for binding compilation and transclusion.

use thiserror::Error;
use trellis_vine::ExprError;

/// Errors raised while compiling or using isolate bindings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A declaration string matched none of the three binding modes.
    /// Fatal at compile time: the isolate scope is never created.
    #[error("unknown binding mode `{definition}` declared for `{local}`")]
    UnknownMode { local: String, definition: String },

    /// A host attribute failed to parse for its declared mode (bad
    /// template, path, or expression). Also fatal at compile time.
    #[error("malformed host attribute for binding `{local}`: {source}")]
    Syntax {
        local: String,
        #[source]
        source: ExprError,
    },

    /// The named binding was not compiled (undeclared, or its host
    /// attribute was absent).
    #[error("no binding named `{0}` was compiled")]
    UnknownBinding(String),

    /// `observe` only applies to literal-text bindings.
    #[error("binding `{0}` is not a literal-text binding")]
    NotObservable(String),

    /// `call` only applies to expression-call bindings.
    #[error("binding `{0}` is not an expression-call binding")]
    NotCallable(String),
}

/// Errors raised by the transclusion manager.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TranscludeError {
    /// The content was already spliced into a slot; splicing moves the
    /// nodes, so a second call has nothing left to move.
    #[error("transcluded content has already been spliced")]
    AlreadySpliced,
}
