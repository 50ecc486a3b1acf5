//! Binding declarations.
//!
//! A component declares how each of its isolate-scope properties relates
//! to the host, using the original sigil spellings or their long names:
//!
//! | spelling            | mode              |
//! |---------------------|-------------------|
//! | `@`, `literal-text` | literal text      |
//! | `=`, `two-way`      | two-way           |
//! | `&`, `expression-call` | expression call |
//!
//! A sigil may be followed by an attribute alias (`"@captionText"` binds
//! the local `caption` to the host attribute `captionText`); without one
//! the attribute name is the local name. Declarations exist only to wire
//! the isolate scope up and are not retained afterward.

use serde::{Deserialize, Serialize};
use trellis_loam::{CompactString, FxHashMap};

use crate::error::BindError;

/// Host attribute values by attribute name, as collected by the adapter
/// at the component's invocation site.
pub type HostAttributes = FxHashMap<CompactString, CompactString>;

/// How an isolate property relates to its host attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BindingMode {
    /// Host attribute is interpolated text; the isolate property holds
    /// the rendered string.
    LiteralText = 0,
    /// Host attribute is a parent-scope path kept in sync with the
    /// isolate property in both directions.
    TwoWay = 1,
    /// Host attribute is an expression invoked explicitly with caller
    /// locals; one-directional, isolate to parent.
    ExpressionCall = 2,
}

/// One parsed binding declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDecl {
    /// The isolate-scope property name.
    pub local: CompactString,
    pub mode: BindingMode,
    /// The host attribute carrying the binding's source text. Defaults
    /// to `local` unless the declaration aliased it.
    pub attribute: CompactString,
}

impl BindingDecl {
    /// Parse a single declaration string for `local`.
    pub fn parse(
        local: impl Into<CompactString>,
        definition: &str,
    ) -> Result<Self, BindError> {
        let local = local.into();
        let (mode, alias) = match definition {
            "literal-text" => (BindingMode::LiteralText, ""),
            "two-way" => (BindingMode::TwoWay, ""),
            "expression-call" => (BindingMode::ExpressionCall, ""),
            _ => match definition.split_at_checked(1) {
                Some(("@", rest)) => (BindingMode::LiteralText, rest),
                Some(("=", rest)) => (BindingMode::TwoWay, rest),
                Some(("&", rest)) => (BindingMode::ExpressionCall, rest),
                _ => {
                    return Err(BindError::UnknownMode {
                        local: local.to_string(),
                        definition: definition.to_string(),
                    })
                }
            },
        };
        let attribute = if alias.is_empty() {
            local.clone()
        } else {
            CompactString::from(alias)
        };
        Ok(Self {
            local,
            mode,
            attribute,
        })
    }
}

/// An ordered set of binding declarations. Order determines wiring order
/// (and therefore watcher registration order) at compile time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDeclarations {
    decls: Vec<BindingDecl>,
}

impl BindingDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `(local, definition)` pairs. Fails on the first unknown
    /// mode so a misconfigured component never gets a scope.
    pub fn parse<I, S>(pairs: I) -> Result<Self, BindError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut decls = Vec::new();
        for (local, definition) in pairs {
            decls.push(BindingDecl::parse(local.as_ref(), definition.as_ref())?);
        }
        Ok(Self { decls })
    }

    /// Append an already-built declaration.
    pub fn push(&mut self, decl: BindingDecl) {
        self.decls.push(decl);
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sigils() {
        let decl = BindingDecl::parse("caption", "@").unwrap();
        assert_eq!(decl.mode, BindingMode::LiteralText);
        assert_eq!(decl.attribute, "caption");

        let decl = BindingDecl::parse("src", "=").unwrap();
        assert_eq!(decl.mode, BindingMode::TwoWay);

        let decl = BindingDecl::parse("onClick", "&").unwrap();
        assert_eq!(decl.mode, BindingMode::ExpressionCall);
    }

    #[test]
    fn test_parse_long_names() {
        assert_eq!(
            BindingDecl::parse("a", "literal-text").unwrap().mode,
            BindingMode::LiteralText
        );
        assert_eq!(
            BindingDecl::parse("a", "two-way").unwrap().mode,
            BindingMode::TwoWay
        );
        assert_eq!(
            BindingDecl::parse("a", "expression-call").unwrap().mode,
            BindingMode::ExpressionCall
        );
    }

    #[test]
    fn test_parse_attribute_alias() {
        let decl = BindingDecl::parse("caption", "@captionText").unwrap();
        assert_eq!(decl.local, "caption");
        assert_eq!(decl.attribute, "captionText");
    }

    #[test]
    fn test_unknown_mode_fails() {
        let err = BindingDecl::parse("x", "%").unwrap_err();
        assert!(matches!(err, BindError::UnknownMode { .. }));
        assert!(BindingDecl::parse("x", "").is_err());
        assert!(BindingDecl::parse("x", "bind").is_err());
    }

    #[test]
    fn test_declarations_preserve_order() {
        let decls =
            BindingDeclarations::parse([("a", "@"), ("b", "="), ("c", "&")]).unwrap();
        let order: Vec<&str> = decls.iter().map(|d| d.local.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn test_declarations_fail_fast() {
        assert!(BindingDeclarations::parse([("a", "@"), ("b", "?")]).is_err());
    }
}
