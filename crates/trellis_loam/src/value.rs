//! Scope property values.
//!
//! Scope properties are a closed variant over scalars, ordered sequences,
//! and string-keyed mappings. Structural equality is defined recursively
//! over the variant; the digest loop relies on it to decide whether a
//! watched expression changed.

use compact_str::{CompactString, ToCompactString};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Mapping values: property name to nested value.
pub type ValueMap = FxHashMap<CompactString, Value>;

/// Sequence values: ordered, heterogeneous.
pub type ValueSeq = Vec<Value>;

/// A scope property value.
///
/// `Undefined` is what evaluation yields for a missing property. It is a
/// legal stored value as well; the watcher machinery uses `Option<Value>`
/// (not `Undefined`) for its "never observed" sentinel, so the two never
/// collide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    /// Missing or never-set.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    Bool(bool),
    Number(f64),
    Str(CompactString),
    Seq(ValueSeq),
    Map(ValueMap),
}

impl Value {
    /// Whether this is the `Undefined` variant.
    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Truthiness, for adapters that branch on a bound value: `Undefined`
    /// and `Null` are false, numbers are true unless zero or NaN, strings
    /// unless empty, sequences and mappings always true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Seq(_) | Value::Map(_) => true,
        }
    }

    /// Borrow as a string slice, if this is a `Str`.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric value, if this is a `Number`.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean value, if this is a `Bool`.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a sequence, if this is a `Seq`.
    #[inline]
    pub fn as_seq(&self) -> Option<&ValueSeq> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a mapping, if this is a `Map`.
    #[inline]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable mapping access, if this is a `Map`.
    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up `key` in a mapping value. Non-mappings and missing keys
    /// both yield `Undefined` (property-path semantics).
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Map(m) => m.get(key).unwrap_or(&Value::Undefined),
            _ => &Value::Undefined,
        }
    }

    /// Render for text interpolation: `Undefined` and `Null` render empty,
    /// scalars render their natural form, sequences and mappings render as
    /// JSON with sorted keys.
    pub fn render(&self) -> CompactString {
        match self {
            Value::Undefined | Value::Null => CompactString::default(),
            Value::Bool(b) => {
                if *b {
                    CompactString::const_new("true")
                } else {
                    CompactString::const_new("false")
                }
            }
            Value::Number(n) => render_number(*n),
            Value::Str(s) => s.clone(),
            Value::Seq(_) | Value::Map(_) => {
                let mut out = std::string::String::new();
                self.render_json(&mut out);
                out.to_compact_string()
            }
        }
    }

    /// JSON form for nested rendering. Map keys are emitted in sorted
    /// order so the output is deterministic.
    fn render_json(&self, out: &mut std::string::String) {
        match self {
            Value::Undefined | Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => out.push_str(&render_number(*n)),
            Value::Str(s) => render_json_string(s, out),
            Value::Seq(seq) => {
                out.push('[');
                for (i, item) in seq.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.render_json(out);
                }
                out.push(']');
            }
            Value::Map(map) => {
                let mut keys: Vec<&CompactString> = map.keys().collect();
                keys.sort_unstable();
                out.push('{');
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    render_json_string(key, out);
                    out.push(':');
                    map[key].render_json(out);
                }
                out.push('}');
            }
        }
    }
}

fn render_json_string(s: &str, out: &mut std::string::String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Integral numbers render without a trailing `.0`.
fn render_number(n: f64) -> CompactString {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        (n as i64).to_compact_string()
    } else {
        n.to_compact_string()
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl PartialEq for Value {
    /// Recursive structural equality. Numbers compare by numeric value,
    /// except that NaN equals NaN: a stored NaN must not read as a fresh
    /// change on every digest cycle.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(CompactString::from(s))
    }
}

impl From<CompactString> for Value {
    fn from(s: CompactString) -> Self {
        Value::Str(s)
    }
}

impl From<std::string::String> for Value {
    fn from(s: std::string::String) -> Self {
        Value::Str(s.into())
    }
}

impl From<ValueSeq> for Value {
    fn from(seq: ValueSeq) -> Self {
        Value::Seq(seq)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Seq(iter.into_iter().collect())
    }
}

impl<K: Into<CompactString>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality_scalars() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_eq!(Value::Undefined, Value::Undefined);
        assert_ne!(Value::Undefined, Value::Null);
    }

    #[test]
    fn test_nan_equals_nan() {
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::from(f64::NAN), Value::from(0.0));
    }

    #[test]
    fn test_structural_equality_nested() {
        let a: Value = [("x", Value::from(1)), ("y", Value::from(vec![Value::from(2)]))]
            .into_iter()
            .collect();
        let b: Value = [("y", Value::from(vec![Value::from(2)])), ("x", Value::from(1))]
            .into_iter()
            .collect();
        assert_eq!(a, b);

        let c: Value = [("x", Value::from(1))].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn test_get_on_non_map() {
        assert!(Value::from(3).get("x").is_undefined());
        assert!(Value::Undefined.get("x").is_undefined());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(Value::from(1).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::Seq(vec![]).is_truthy());
    }

    #[test]
    fn test_render() {
        assert_eq!(Value::from(42).render(), "42");
        assert_eq!(Value::from(1.5).render(), "1.5");
        assert_eq!(Value::from("hi").render(), "hi");
        assert_eq!(Value::Undefined.render(), "");
        assert_eq!(Value::Null.render(), "");
        assert_eq!(Value::from(true).render(), "true");
        assert_eq!(
            Value::Seq(vec![Value::from(1), Value::from("a")]).render(),
            r#"[1,"a"]"#
        );

        let map: Value = [("b", Value::from(2)), ("a", Value::from(1))]
            .into_iter()
            .collect();
        assert_eq!(map.render(), r#"{"a":1,"b":2}"#);
    }
}
