//! Recursive-descent parser for the restricted expression grammar.
//!
//! ```text
//! expr  := path | call
//! call  := ident "(" [ path ("," path)* ] ")"
//! path  := ident ("." ident)*
//! ident := [A-Za-z_$][A-Za-z0-9_$]*
//! ```
//!
//! ASCII whitespace is permitted between tokens. The parser works on raw
//! bytes the way the armature tokenizer does; identifiers are ASCII, so a
//! multibyte character can only ever appear in error position.

use trellis_loam::CompactString;

use crate::ast::{CallExpr, Expr, PathExpr, PathSegments};
use crate::error::ExprError;

/// Character codes for fast comparison
mod char_codes {
    pub const TAB: u8 = 0x09;
    pub const NEWLINE: u8 = 0x0A;
    pub const CARRIAGE_RETURN: u8 = 0x0D;
    pub const SPACE: u8 = 0x20;
    pub const DOLLAR: u8 = 0x24;
    pub const LEFT_PAREN: u8 = 0x28;
    pub const RIGHT_PAREN: u8 = 0x29;
    pub const COMMA: u8 = 0x2C;
    pub const DOT: u8 = 0x2E;
    pub const UNDERSCORE: u8 = 0x5F;
}

use char_codes::*;

#[inline]
const fn is_whitespace(b: u8) -> bool {
    matches!(b, SPACE | TAB | NEWLINE | CARRIAGE_RETURN)
}

#[inline]
const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == UNDERSCORE || b == DOLLAR
}

#[inline]
const fn is_ident_part(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Parse an expression: a property path or a single call form.
pub fn parse(source: &str) -> Result<Expr, ExprError> {
    let mut cursor = Cursor::new(source);
    let expr = cursor.parse_expr()?;
    cursor.expect_end()?;
    Ok(expr)
}

/// Parse a plain property path. Call forms are rejected here with an
/// `UnexpectedChar` at the opening parenthesis.
pub fn parse_path(source: &str) -> Result<PathExpr, ExprError> {
    let mut cursor = Cursor::new(source);
    let path = cursor.parse_path()?;
    cursor.expect_end()?;
    Ok(path)
}

struct Cursor<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && is_whitespace(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// The (possibly multibyte) character at the current position, for
    /// error reporting.
    fn current_char(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn unexpected(&self) -> ExprError {
        ExprError::UnexpectedChar {
            found: self.current_char(),
            offset: self.pos,
        }
    }

    fn expect_end(&mut self) -> Result<(), ExprError> {
        self.skip_whitespace();
        if self.pos < self.bytes.len() {
            return Err(self.unexpected());
        }
        Ok(())
    }

    fn parse_ident(&mut self) -> Result<CompactString, ExprError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some(b) if !is_ident_start(b) => Err(self.unexpected()),
            Some(_) => {
                let start = self.pos;
                while self.pos < self.bytes.len() && is_ident_part(self.bytes[self.pos]) {
                    self.pos += 1;
                }
                Ok(CompactString::from(&self.source[start..self.pos]))
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(ExprError::Empty);
        }
        let head = self.parse_ident()?;
        self.skip_whitespace();
        match self.peek() {
            Some(LEFT_PAREN) => {
                self.pos += 1;
                let args = self.parse_args()?;
                Ok(Expr::Call(CallExpr { callee: head, args }))
            }
            _ => {
                let mut segments = PathSegments::new();
                segments.push(head);
                self.parse_path_rest(&mut segments)?;
                Ok(Expr::Path(PathExpr { segments }))
            }
        }
    }

    fn parse_path(&mut self) -> Result<PathExpr, ExprError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(ExprError::Empty);
        }
        let mut segments = PathSegments::new();
        segments.push(self.parse_ident()?);
        self.parse_path_rest(&mut segments)?;
        Ok(PathExpr { segments })
    }

    fn parse_path_rest(&mut self, segments: &mut PathSegments) -> Result<(), ExprError> {
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(DOT) => {
                    self.pos += 1;
                    segments.push(self.parse_ident()?);
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_args(&mut self) -> Result<Vec<PathExpr>, ExprError> {
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(RIGHT_PAREN) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_path()?);
            self.skip_whitespace();
            match self.peek() {
                Some(COMMA) => {
                    self.pos += 1;
                }
                Some(RIGHT_PAREN) => {
                    self.pos += 1;
                    return Ok(args);
                }
                Some(_) => return Err(self.unexpected()),
                None => return Err(ExprError::UnexpectedEnd),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_path() {
        let expr = parse("photo").unwrap();
        assert_eq!(expr, Expr::Path(PathExpr::new(["photo"])));
    }

    #[test]
    fn test_parse_dotted_path() {
        let expr = parse("photo.meta.date").unwrap();
        assert_eq!(expr, Expr::Path(PathExpr::new(["photo", "meta", "date"])));
    }

    #[test]
    fn test_parse_path_with_whitespace() {
        let expr = parse("  photo . date  ").unwrap();
        assert_eq!(expr, Expr::Path(PathExpr::new(["photo", "date"])));
    }

    #[test]
    fn test_parse_call_no_args() {
        let expr = parse("refresh()").unwrap();
        assert_eq!(
            expr,
            Expr::Call(CallExpr {
                callee: "refresh".into(),
                args: vec![],
            })
        );
    }

    #[test]
    fn test_parse_call_with_args() {
        let expr = parse("onScroll(offset, event.delta)").unwrap();
        assert_eq!(
            expr,
            Expr::Call(CallExpr {
                callee: "onScroll".into(),
                args: vec![PathExpr::new(["offset"]), PathExpr::new(["event", "delta"])],
            })
        );
    }

    #[test]
    fn test_parse_dollar_and_underscore_idents() {
        let expr = parse("$event._raw").unwrap();
        assert_eq!(expr, Expr::Path(PathExpr::new(["$event", "_raw"])));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert_eq!(parse(""), Err(ExprError::Empty));
        assert_eq!(parse("   "), Err(ExprError::Empty));
    }

    #[test]
    fn test_parse_trailing_dot_is_error() {
        assert_eq!(parse("photo."), Err(ExprError::UnexpectedEnd));
    }

    #[test]
    fn test_parse_leading_digit_is_error() {
        assert_eq!(
            parse("1photo"),
            Err(ExprError::UnexpectedChar {
                found: '1',
                offset: 0,
            })
        );
    }

    #[test]
    fn test_parse_unclosed_call_is_error() {
        assert_eq!(parse("onScroll(offset"), Err(ExprError::UnexpectedEnd));
    }

    #[test]
    fn test_parse_trailing_garbage_is_error() {
        assert_eq!(
            parse("photo.date!"),
            Err(ExprError::UnexpectedChar {
                found: '!',
                offset: 10,
            })
        );
    }

    #[test]
    fn test_parse_nested_call_is_error() {
        // Arguments are paths, not arbitrary expressions.
        assert!(matches!(
            parse("f(g())"),
            Err(ExprError::UnexpectedChar { found: '(', .. })
        ));
    }

    #[test]
    fn test_parse_path_rejects_call() {
        assert!(matches!(
            parse_path("onScroll(x)"),
            Err(ExprError::UnexpectedChar { found: '(', .. })
        ));
    }

    #[test]
    fn test_error_offset_points_at_multibyte_char() {
        let err = parse("photo.événement").unwrap_err();
        assert_eq!(
            err,
            ExprError::UnexpectedChar {
                found: 'é',
                offset: 6,
            }
        );
    }
}
