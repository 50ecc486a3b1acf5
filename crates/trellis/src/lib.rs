//! # Trellis
//!
//! Reactive scope binding and digest engine.
//!
//! A trellis is the frame a climbing plant grows along. This crate is
//! the frame for data: a tree of scopes whose properties inherit down
//! the branches, watched expressions that fire when their values drift,
//! and a digest loop that keeps re-checking the whole tree until it
//! settles. On top of that sit the component pieces: isolate scopes
//! wired to their hosts through declared binding modes, and transcluded
//! content that stays rooted in the scope that authored it.
//!
//! This crate re-exports all Trellis sub-crates for unified
//! documentation, plus the types most adapters need at the top level.
//!
//! ## Crates
//!
//! - [`loam`] - Dynamic value model and shared utilities
//! - [`vine`] - Expression and text-template parsing
//! - [`arbor`] - Scope tree, evaluation, watchers and the digest loop
//! - [`graft`] - Isolate binding compiler and transclusion
//!
//! ## Example
//!
//! ```
//! use trellis::{ScopeTree, Value};
//!
//! let mut tree = ScopeTree::new();
//! let root = tree.root();
//! tree.set(root, "celsius", Value::from(25));
//!
//! tree.watch(root, "celsius", |tree, new, _old| {
//!     if let Some(c) = new.as_number() {
//!         tree.set(tree.root(), "fahrenheit", Value::from(c * 9.0 / 5.0 + 32.0));
//!     }
//! })
//! .unwrap();
//!
//! tree.digest(root).unwrap();
//! assert_eq!(tree.get(root, "fahrenheit"), Value::from(77.0));
//! ```

/// Dynamic value model and shared utilities.
pub use trellis_loam as loam;

/// Expression and text-template parsing.
pub use trellis_vine as vine;

/// Scope tree, evaluation, watchers and the digest loop.
pub use trellis_arbor as arbor;

/// Isolate binding compiler and transclusion.
pub use trellis_graft as graft;

pub use trellis_arbor::{
    DigestError, DigestOptions, DigestReport, EvalError, Locals, ScopeId, ScopeTree,
    WatcherHandle,
};
pub use trellis_graft::{
    capture, compile_isolate, compile_isolate_with, BindError, BindingDecl, BindingDeclarations,
    BindingMode, HostAttributes, IsolateBindings, Slot, TranscludeError, TranscludedContent,
};
pub use trellis_loam::Value;
pub use trellis_vine::{
    parse, parse_path, parse_template, Expr, ExprError, PathExpr, TemplateOptions, TextTemplate,
};
