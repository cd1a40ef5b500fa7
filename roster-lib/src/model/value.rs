//! Value enum for dynamic field values

use std::borrow::Cow;

use serde::Deserialize;
use serde::Serialize;

/// A scalar value stored in a record field.
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | true/false | `Bool` |
/// | integer | `Int` |
/// | fractional number | `Float` |
/// | string | `String` |
/// | array, object | `Json` |
///
/// # Example
///
/// ```
/// use roster_lib::model::Value;
///
/// let name = Value::from("Ana");
/// let age = Value::from(31i64);
/// assert_eq!(age.display(), "31");
/// assert_eq!(Value::Null.display(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(String),
    /// Fallback for structured JSON values.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` for null, empty and whitespace-only strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Json(_) => "json",
        }
    }

    /// Returns the string form used for display and for sorting.
    ///
    /// `Null` renders as the empty string.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Int(n) => Cow::Owned(n.to_string()),
            Value::Float(n) => Cow::Owned(n.to_string()),
            Value::String(s) => Cow::Borrowed(s.as_str()),
            Value::Json(v) => Cow::Owned(v.to_string()),
        }
    }

    /// Parses free-form user input into the narrowest matching value.
    ///
    /// Empty input becomes `Null`; numbers and booleans are recognised,
    /// anything else becomes a string without the surrounding whitespace.
    pub fn parse_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::Int(n);
        }
        match trimmed {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(trimmed.to_string()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Json(serde_json::Value::Number(n))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Json(other),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(Value::Null.display(), "");
        assert_eq!(Value::Bool(false).display(), "false");
        assert_eq!(Value::Float(2.5).display(), "2.5");
        assert_eq!(Value::Json(serde_json::json!([1, 2])).display(), "[1,2]");
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(Value::parse_input("  "), Value::Null);
        assert_eq!(Value::parse_input("42"), Value::Int(42));
        assert_eq!(Value::parse_input("true"), Value::Bool(true));
        assert_eq!(Value::parse_input("  Ana "), Value::String("Ana".to_string()));
    }
}
