//! Expression AST node types.
//!
//! The grammar is deliberately small: a watched or bound expression is
//! either a dotted property path or a single call form whose arguments
//! are themselves property paths. `Display` renders the canonical source
//! form; digest diagnostics use it to report non-converging watchers.

use serde::{Deserialize, Serialize};
use trellis_loam::{CompactString, SmallVec};

/// Most paths are short; segments stay on the stack up to this count.
const SEGMENT_INLINE_CAP: usize = 4;

/// Segment storage for a property path (stack-allocated for short paths).
pub type PathSegments = SmallVec<[CompactString; SEGMENT_INLINE_CAP]>;

/// A dotted property path, e.g. `photo.date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpr {
    /// Path segments, in source order. Never empty.
    pub segments: PathSegments,
}

impl PathExpr {
    /// Build a path from segment strings. Intended for tests and adapters
    /// that construct paths programmatically; user input goes through
    /// [`crate::parse_path`].
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The first segment - the name resolved against locals or the scope
    /// chain.
    #[inline]
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Segments after the first, walked through nested mappings.
    #[inline]
    pub fn tail(&self) -> &[CompactString] {
        &self.segments[1..]
    }

    /// Whether this path is a single bare identifier.
    #[inline]
    pub fn is_bare(&self) -> bool {
        self.segments.len() == 1
    }
}

impl std::fmt::Display for PathExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// A call form, e.g. `onScroll(offset)`. Arguments are property paths
/// resolved against caller-supplied locals merged over the scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallExpr {
    /// The function name, resolved through the scope chain.
    pub callee: CompactString,
    /// Argument paths, in source order.
    pub args: Vec<PathExpr>,
}

impl std::fmt::Display for CallExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.callee)?;
        f.write_str("(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// A parsed expression: a property path or a call form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Path(PathExpr),
    Call(CallExpr),
}

impl Expr {
    /// The path form, if this is one. Assignment requires it.
    #[inline]
    pub fn as_path(&self) -> Option<&PathExpr> {
        match self {
            Expr::Path(p) => Some(p),
            Expr::Call(_) => None,
        }
    }

    /// Whether this is a call form.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call(_))
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Path(p) => write!(f, "{p}"),
            Expr::Call(c) => write!(f, "{c}"),
        }
    }
}

impl From<PathExpr> for Expr {
    fn from(path: PathExpr) -> Self {
        Expr::Path(path)
    }
}

impl From<CallExpr> for Expr {
    fn from(call: CallExpr) -> Self {
        Expr::Call(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = PathExpr::new(["photo", "date"]);
        assert_eq!(path.to_string(), "photo.date");
        assert_eq!(path.head(), "photo");
        assert_eq!(path.tail().len(), 1);
        assert!(!path.is_bare());
    }

    #[test]
    fn test_call_display() {
        let call = CallExpr {
            callee: "onScroll".into(),
            args: vec![PathExpr::new(["offset"]), PathExpr::new(["event", "kind"])],
        };
        assert_eq!(call.to_string(), "onScroll(offset, event.kind)");
    }
}
