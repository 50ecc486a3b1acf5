//! Literal-text templates.
//!
//! A literal-text host attribute like `"Taken on: {{photo.date}}"` parses
//! into alternating literal and path parts. Delimiters are configurable
//! the same way the template parser's interpolation markers are; the
//! defaults are `{{` and `}}`.

use memchr::memmem;
use serde::{Deserialize, Serialize};
use trellis_loam::CompactString;

use crate::ast::PathExpr;
use crate::error::ExprError;
use crate::parser::parse_path;

/// Template parsing options
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Interpolation delimiters (default: `("{{", "}}")`)
    pub delimiters: (CompactString, CompactString),
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            delimiters: (
                CompactString::const_new("{{"),
                CompactString::const_new("}}"),
            ),
        }
    }
}

/// One part of a parsed text template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextPart {
    /// Verbatim text between interpolations.
    Literal(CompactString),
    /// An embedded property path.
    Path(PathExpr),
}

/// A parsed literal-text attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextTemplate {
    /// Parts in source order. Empty literals are dropped.
    pub parts: Vec<TextPart>,
}

impl TextTemplate {
    /// Whether the template embeds no paths at all. Static templates
    /// register no watchers.
    pub fn is_static(&self) -> bool {
        self.parts
            .iter()
            .all(|part| matches!(part, TextPart::Literal(_)))
    }

    /// The embedded paths, in source order.
    pub fn paths(&self) -> impl Iterator<Item = &PathExpr> {
        self.parts.iter().filter_map(|part| match part {
            TextPart::Path(path) => Some(path),
            TextPart::Literal(_) => None,
        })
    }

    /// Concatenate current values into the final string. `resolve` is
    /// called once per embedded path; the caller supplies scope lookup.
    pub fn render<F>(&self, mut resolve: F) -> CompactString
    where
        F: FnMut(&PathExpr) -> CompactString,
    {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TextPart::Literal(text) => out.push_str(text),
                TextPart::Path(path) => out.push_str(&resolve(path)),
            }
        }
        out.into()
    }
}

/// Split `source` into literal and interpolated parts and parse each
/// interpolation as a property path.
pub fn parse_template(source: &str, options: &TemplateOptions) -> Result<TextTemplate, ExprError> {
    let (open, close) = (&options.delimiters.0, &options.delimiters.1);
    let open_finder = memmem::Finder::new(open.as_bytes());
    let close_finder = memmem::Finder::new(close.as_bytes());

    let mut parts = Vec::new();
    let mut rest = source;
    let mut offset = 0usize;

    while let Some(start) = open_finder.find(rest.as_bytes()) {
        if start > 0 {
            parts.push(TextPart::Literal(CompactString::from(&rest[..start])));
        }
        let after_open = start + open.len();
        let Some(end) = close_finder.find(rest[after_open..].as_bytes()) else {
            return Err(ExprError::UnterminatedInterpolation {
                offset: offset + start,
            });
        };
        let inner = &rest[after_open..after_open + end];
        parts.push(TextPart::Path(parse_path(inner)?));
        let consumed = after_open + end + close.len();
        offset += consumed;
        rest = &rest[consumed..];
    }
    if !rest.is_empty() {
        parts.push(TextPart::Literal(CompactString::from(rest)));
    }

    Ok(TextTemplate { parts })
}
