//! Loam - The foundation soil for Trellis.
//!
//! This crate provides the shared value model and utility re-exports for the
//! Trellis scope-binding engine, much like loam is the soil every part of a
//! trellised garden grows out of.
//!
//! # Modules
//!
//! - **Value**: the closed variant type scope properties are made of, with
//!   recursive structural equality
//! - **Shared utilities**: string, collection, and flag types used across
//!   the workspace
//!
//! # Example
//!
//! ```
//! use trellis_loam::{Value, ValueMap};
//!
//! let mut photo = ValueMap::default();
//! photo.insert("date".into(), Value::from("2013-10-01"));
//!
//! let value = Value::Map(photo);
//! assert_eq!(value.get("date"), &Value::from("2013-10-01"));
//! assert!(value.is_truthy());
//! ```

mod value;

pub use value::{Value, ValueMap, ValueSeq};

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;
pub use compact_str::CompactString as String;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};
