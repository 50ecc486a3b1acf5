//! Expression syntax errors.

use thiserror::Error;

/// Errors produced while parsing an expression or text template.
///
/// Missing scope properties are never a syntax concern; these errors only
/// cover malformed source text. Offsets are byte offsets into the parsed
/// source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// The source was empty or all whitespace.
    #[error("empty expression")]
    Empty,

    /// An unexpected character where an identifier or punctuation was
    /// required.
    #[error("unexpected character `{found}` at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    /// The expression ended mid-construct (e.g. a trailing `.` or an
    /// unclosed argument list).
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// An interpolation opener without a matching closer.
    #[error("unterminated interpolation starting at offset {offset}")]
    UnterminatedInterpolation { offset: usize },
}
