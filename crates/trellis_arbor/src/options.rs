//! Digest options.

use serde::{Deserialize, Serialize};

/// Options controlling a digest run.
///
/// The iteration cap is deliberately a visible configuration value
/// rather than a hidden constant so tests can shrink it to exercise
/// [`DigestError::LimitExceeded`](crate::DigestError::LimitExceeded)
/// cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestOptions {
    /// Maximum number of full-tree traversals before the digest gives up
    /// (default: 10).
    pub max_traversals: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self { max_traversals: 10 }
    }
}

impl DigestOptions {
    /// Options with a custom traversal cap.
    pub const fn with_max_traversals(max_traversals: usize) -> Self {
        Self { max_traversals }
    }
}
