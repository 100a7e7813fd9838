//! Heterogeneous tag values carried by design-space rows.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A single tag value: a constant, a swept value, or a derived value.
///
/// Integers and floats compare numerically, so `Int(8) == Float(8.0)`. Text
/// and booleans only compare equal to values of the same kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Free text.
    Text(String),
}

impl TagValue {
    /// Parses a trimmed token, preferring integer, then float, then boolean.
    pub fn parse(token: &str) -> Self {
        let trimmed = token.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return TagValue::Int(value);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return TagValue::Float(value);
        }
        match trimmed {
            "true" | "True" => TagValue::Bool(true),
            "false" | "False" => TagValue::Bool(false),
            _ => TagValue::Text(trimmed.to_string()),
        }
    }

    /// Returns the numeric value of integer and float tags.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Int(value) => Some(*value as f64),
            TagValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text of a text tag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for TagValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TagValue::Bool(a), TagValue::Bool(b)) => a == b,
            (TagValue::Text(a), TagValue::Text(b)) => a == b,
            (TagValue::Int(a), TagValue::Int(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Bool(value) => write!(f, "{value}"),
            TagValue::Int(value) => write!(f, "{value}"),
            TagValue::Float(value) => write!(f, "{value}"),
            TagValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        TagValue::Int(value as i64)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        TagValue::Int(value as i64)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}
