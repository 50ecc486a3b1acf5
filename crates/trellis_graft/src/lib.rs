//! # trellis_graft
//!
//! Graft - Component wiring for Trellis.
//!
//! ## Name Origin
//!
//! Grafting joins living material from one plant onto the rootstock of
//! another so both grow as one. `trellis_graft` does the same for
//! component instances: it joins an isolated scope onto a host scope
//! through declared binding modes, and it re-parents originally-authored
//! content into a component's slot while keeping it rooted in the scope
//! that grew it.
//!
//! ## Purpose
//!
//! - **Binding declarations**: `@` literal-text, `=` two-way, `&`
//!   expression-call, parsed once at compile time
//! - **Isolate compiler**: builds an isolated child scope and wires each
//!   declared binding through `trellis_arbor` watchers
//! - **Transclusion**: captures content under its creating scope and
//!   splices it into a target slot exactly once
//!
//! ## Example
//!
//! ```
//! use trellis_arbor::ScopeTree;
//! use trellis_graft::{compile_isolate, BindingDeclarations, HostAttributes};
//! use trellis_loam::Value;
//!
//! let mut tree = ScopeTree::new();
//! let host = tree.root();
//! tree.set(host, "photo", [("date", Value::from("2013-10-01"))].into_iter().collect());
//!
//! let decls = BindingDeclarations::parse([("caption", "@")]).unwrap();
//! let mut attrs = HostAttributes::default();
//! attrs.insert("caption".into(), "Taken on: {{photo.date}}".into());
//!
//! let bindings = compile_isolate(&mut tree, host, &decls, &attrs).unwrap();
//! tree.digest(host).unwrap();
//! assert_eq!(
//!     tree.get_local(bindings.scope(), "caption"),
//!     Value::from("Taken on: 2013-10-01"),
//! );
//! ```

mod binding;
mod error;
mod isolate;
mod transclude;

pub use binding::{BindingDecl, BindingDeclarations, BindingMode, HostAttributes};
pub use error::{BindError, TranscludeError};
pub use isolate::{compile_isolate, compile_isolate_with, IsolateBindings};
pub use transclude::{capture, Slot, TranscludedContent};
