//! Literal Rendering
//!
//! Renders scalar comparands as OData literals: strings are single-quoted
//! with embedded quotes doubled, numbers and booleans are emitted bare.

use serde_json::Value;

/// A single comparand
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Quoted text value
    String(String),
    /// Integer value
    Integer(i64),
    /// Integer above `i64::MAX`
    Unsigned(u64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl Scalar {
    /// Convert a JSON scalar. Arrays, objects and `null` are not scalars.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Some(Self::Integer(i)),
                (None, Some(u)) => Some(Self::Unsigned(u)),
                (None, None) => n.as_f64().map(Self::Float),
            },
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Canonical unquoted text form
    pub fn text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Unsigned(u) => u.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// NaN and infinities have no literal form
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(f) => f.is_finite(),
            _ => true,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Self::Integer(i),
            Err(_) => Self::Unsigned(value),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Render a scalar as an OData literal
pub fn render_literal(value: &Scalar) -> String {
    match value {
        Scalar::String(s) => quote(s),
        other => other.text(),
    }
}

/// Render a `like` comparand. Always quoted; `*` is left for the backend.
pub fn render_like(value: &Scalar) -> String {
    quote(&value.text())
}

/// Wrap in single quotes, doubling any embedded quote
pub fn quote(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Reverse `quote`. Returns `None` if the input is not a quoted literal.
pub fn unescape_literal(literal: &str) -> Option<String> {
    let inner = literal
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))?;
    Some(inner.replace("''", "'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("test"), "test");
        assert_eq!(escape_string("it's"), "it''s");
        assert_eq!(escape_string("O'Brien"), "O''Brien");
    }

    #[test]
    fn test_render_literal() {
        assert_eq!(render_literal(&"ABC".into()), "'ABC'");
        assert_eq!(render_literal(&"O'Brien".into()), "'O''Brien'");
        assert_eq!(render_literal(&42i64.into()), "42");
        assert_eq!(render_literal(&(-7i32).into()), "-7");
        assert_eq!(render_literal(&12.5f64.into()), "12.5");
        assert_eq!(render_literal(&u64::MAX.into()), "18446744073709551615");
        assert_eq!(render_literal(&7u64.into()), "7");
        assert_eq!(render_literal(&100.0f64.into()), "100");
        assert_eq!(render_literal(&true.into()), "true");
        assert_eq!(render_literal(&false.into()), "false");
    }

    #[test]
    fn test_render_like() {
        assert_eq!(render_like(&"ACME*".into()), "'ACME*'");
        assert_eq!(render_like(&"d'Arc*".into()), "'d''Arc*'");
        assert_eq!(render_like(&15i64.into()), "'15'");
    }

    #[test]
    fn test_unescape_round_trip() {
        for original in ["O'Brien", "''", "plain", "a''b'c", ""] {
            let literal = quote(original);
            assert_eq!(unescape_literal(&literal).as_deref(), Some(original));
        }
        assert_eq!(unescape_literal("42"), None);
        assert_eq!(unescape_literal("'"), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Scalar::from_json(&json!("x")), Some(Scalar::from("x")));
        assert_eq!(Scalar::from_json(&json!(3)), Some(Scalar::Integer(3)));
        assert_eq!(Scalar::from_json(&json!(2.5)), Some(Scalar::Float(2.5)));
        assert_eq!(
            Scalar::from_json(&json!(u64::MAX)),
            Some(Scalar::Unsigned(u64::MAX))
        );
        assert_eq!(Scalar::from_json(&json!(true)), Some(Scalar::Bool(true)));
        assert_eq!(Scalar::from_json(&json!(null)), None);
        assert_eq!(Scalar::from_json(&json!([1])), None);
        assert_eq!(Scalar::from_json(&json!({"eq": 1})), None);
    }

    #[test]
    fn test_is_finite() {
        assert!(Scalar::Float(1.0).is_finite());
        assert!(!Scalar::Float(f64::NAN).is_finite());
        assert!(!Scalar::Float(f64::INFINITY).is_finite());
        assert!(Scalar::from("NaN").is_finite());
    }
}
