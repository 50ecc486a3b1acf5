//! # trellis_arbor
//!
//! Arbor - The living structure of Trellis.
//!
//! ## Name Origin
//!
//! An arbor is the built frame a garden grows on. `trellis_arbor` is the
//! frame the rest of the engine grows on: the tree of mutable scopes,
//! the watchers that observe expressions against it, and the digest loop
//! that re-evaluates everything until the tree stops changing.
//!
//! ## Purpose
//!
//! - **Scope tree**: id-keyed scopes with prototypal property inheritance
//!   and an isolation short-circuit
//! - **Evaluation**: paths and call forms resolved against a scope, with
//!   caller-supplied locals taking precedence
//! - **Watchers**: per-scope (expression, last value, callback) triples
//! - **Digest**: repeated depth-first traversals until a full pass runs
//!   clean, bounded by a configurable iteration cap
//!
//! ## Example
//!
//! ```
//! use trellis_arbor::ScopeTree;
//! use trellis_loam::Value;
//!
//! let mut tree = ScopeTree::new();
//! let root = tree.root();
//! tree.set(root, "count", Value::from(1));
//!
//! tree.watch(root, "count", |_, new, _| {
//!     assert!(new.as_number().is_some());
//! })
//! .unwrap();
//!
//! tree.digest(root).unwrap();
//! ```

mod digest;
mod error;
mod eval;
mod options;
mod scope;
mod watch;

pub use digest::DigestReport;
pub use error::{DigestError, EvalError};
pub use options::DigestOptions;
pub use scope::{NativeFn, ScopeFlags, ScopeId, ScopeTree};
pub use watch::{WatchCallback, WatcherHandle, WatcherId};

use trellis_loam::{CompactString, FxHashMap, Value};

/// Caller-supplied locals, merged over the scope during evaluation.
/// Lookup of a path's first segment checks locals before the scope chain.
pub type Locals = FxHashMap<CompactString, Value>;
