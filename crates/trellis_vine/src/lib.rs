//! # trellis_vine
//!
//! Vine - The expression layer for Trellis.
//!
//! ## Name Origin
//!
//! A vine is what actually climbs a trellis: thin, flexible growth that
//! follows the frame wherever it leads. `trellis_vine` is the thin
//! expression language that climbs the scope tree - property paths, call
//! forms, and text interpolation - without carrying any evaluation state
//! of its own.
//!
//! ## Purpose
//!
//! This crate owns the *syntactic* half of the engine:
//!
//! - **AST**: `PathExpr`, `CallExpr`, `Expr`
//! - **Parser**: a hand-written byte scanner for the restricted expression
//!   grammar (dotted paths and `name(path, ...)` call forms)
//! - **Templates**: `TextTemplate`, the parsed form of a literal-text
//!   attribute with `{{ path }}` interpolations (delimiters configurable)
//!
//! Evaluation against scopes lives in `trellis_arbor`; this crate never
//! sees a scope.

mod ast;
mod error;
mod parser;
mod template;

pub use ast::{CallExpr, Expr, PathExpr, PathSegments};
pub use error::ExprError;
pub use parser::{parse, parse_path};
pub use template::{parse_template, TemplateOptions, TextPart, TextTemplate};
