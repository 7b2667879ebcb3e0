//! Attribute value type stored in wells and carried on graph elements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single attribute value.
///
/// Tables and protocol writers only ever produce scalars, so the type
/// covers the handful of cell kinds a plate file can hold:
/// - `Null`: an empty cell, never counted as a value
/// - `Bool`, `Int`, `Float`, `String`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
    pub fn is_numeric(&self) -> bool { matches!(self, Value::Int(_) | Value::Float(_)) }
    pub fn is_string(&self) -> bool { matches!(self, Value::String(_)) }

    /// Whether this value occupies a well attribute.
    ///
    /// `Null`, NaN and the empty string are all "nothing here".
    pub fn has_value(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Float(f) => !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Bool(_) | Value::Int(_) => true,
        }
    }

    /// Attempt to extract as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Attempt to extract as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempt to extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a raw table cell: empty → `Null`, then integer, float, string.
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        Value::String(trimmed.to_owned())
    }

    /// Render as a table cell. Absent values render as the empty cell.
    /// Floats keep a decimal point so they read back as floats.
    pub fn to_cell(&self) -> String {
        if !self.has_value() {
            return String::new();
        }
        match self {
            Value::String(s) => s.clone(),
            Value::Float(f) => format!("{f:?}"),
            other => other.to_string(),
        }
    }

    /// Equality used when matching wells: absent equals absent, and numbers
    /// compare by value (`Int(2)` is `Float(2.0)`).
    pub fn same_as(&self, other: &Value) -> bool {
        match (self.has_value(), other.has_value()) {
            (false, false) => true,
            (true, true) if self.is_numeric() && other.is_numeric() => {
                self.as_float() == other.as_float()
            }
            (true, true) => self == other,
            _ => false,
        }
    }
}

/// Free-function form of [`Value::has_value`], handy in iterator chains.
pub fn has_value(value: &Value) -> bool {
    value.has_value()
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(2.5), Value::Float(2.5));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_has_value() {
        assert!(!Value::Null.has_value());
        assert!(!Value::Float(f64::NAN).has_value());
        assert!(!Value::from("").has_value());
        assert!(Value::from("buffer").has_value());
        assert!(Value::Int(0).has_value());
        assert!(Value::Bool(false).has_value());
        assert!(has_value(&Value::Float(0.5)));
    }

    #[test]
    fn test_from_cell() {
        assert_eq!(Value::from_cell(""), Value::Null);
        assert_eq!(Value::from_cell("  "), Value::Null);
        assert_eq!(Value::from_cell("12"), Value::Int(12));
        assert_eq!(Value::from_cell("1.5"), Value::Float(1.5));
        assert_eq!(Value::from_cell("pSB1C3"), Value::from("pSB1C3"));
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(Value::Null.to_cell(), "");
        assert_eq!(Value::Float(f64::NAN).to_cell(), "");
        assert_eq!(Value::from("ladder").to_cell(), "ladder");
        assert_eq!(Value::Int(7).to_cell(), "7");
        assert_eq!(Value::Float(2.0).to_cell(), "2.0");
        assert_eq!(Value::from_cell(&Value::Float(2.0).to_cell()), Value::Float(2.0));
    }

    #[test]
    fn test_same_as() {
        assert!(Value::Int(2).same_as(&Value::Float(2.0)));
        assert!(!Value::Int(2).same_as(&Value::Float(2.5)));
        assert!(Value::Null.same_as(&Value::from("")));
        assert!(Value::Float(f64::NAN).same_as(&Value::Null));
        assert!(!Value::Null.same_as(&Value::Int(0)));
        assert!(!Value::from("2").same_as(&Value::Int(2)));
    }
}
