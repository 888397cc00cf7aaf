/// Run-time values exchanged between the client-app and the server-app.
///
/// Data crosses networks and programming paradigms, so only four primitive
/// shapes exist: text, integer, decimal and boolean. Dates travel as text in
/// `yyyy-mm-dd` form and timestamps as text in `yyyy-mm-ddThh:mm:ss.fffZ` form.
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::ValueType;

/// Open string-keyed map. Iteration order is unspecified.
pub type StringMap<T> = HashMap<String, T>;

/// Generic payload of a service request or response.
pub type Vo = serde_json::Map<String, serde_json::Value>;

/// A primitive run-time value.
///
/// Serialized untagged: a JSON string, number or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// `true` or `false`.
    Boolean(bool),
    /// A whole number.
    Integer(i64),
    /// A number with a fractional part.
    Decimal(f64),
    /// Text, including dates and timestamps in their canonical text form.
    Text(String),
}

impl Value {
    /// Returns the sentinel that stands in for "no value" when text could not
    /// be parsed into `value_type`.
    ///
    /// - text, date, timestamp: empty text
    /// - integer, decimal: `NaN`
    /// - boolean: `false`
    ///
    /// The boolean sentinel cannot be told apart from a genuine `false`; the
    /// accompanying validation messages are authoritative.
    pub fn null_for(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Text | ValueType::Date | ValueType::Timestamp => Self::Text(String::new()),
            ValueType::Integer | ValueType::Decimal => Self::Decimal(f64::NAN),
            ValueType::Boolean => Self::Boolean(false),
        }
    }

    /// Returns `true` if `self` is the sentinel [`Value::null_for`] returns
    /// for `value_type`.
    pub fn is_null_for(&self, value_type: ValueType) -> bool {
        match (self, value_type) {
            (Self::Text(s), ValueType::Text | ValueType::Date | ValueType::Timestamp) => {
                s.is_empty()
            }
            (Self::Decimal(d), ValueType::Integer | ValueType::Decimal) => d.is_nan(),
            (Self::Boolean(b), ValueType::Boolean) => !*b,
            (Self::Boolean(_) | Self::Integer(_) | Self::Decimal(_) | Self::Text(_), _) => false,
        }
    }

    /// Returns the inner text, if this is a [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Boolean(_) | Self::Integer(_) | Self::Decimal(_) => None,
        }
    }

    /// Returns the inner integer, if this is a [`Value::Integer`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Boolean(_) | Self::Decimal(_) | Self::Text(_) => None,
        }
    }

    /// Returns the numeric value of an integer or decimal.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Decimal(d) => Some(*d),
            Self::Boolean(_) | Self::Text(_) => None,
        }
    }

    /// Returns the inner boolean, if this is a [`Value::Boolean`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Integer(_) | Self::Decimal(_) | Self::Text(_) => None,
        }
    }

    /// Converts into a [`serde_json::Value`]. Non-finite decimals become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Decimal(d) => serde_json::Number::from_f64(*d)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Canonical boolean sets
// ---------------------------------------------------------------------------

/// Maps text onto the canonical boolean sets.
///
/// `""`, `"0"` and `"false"` are false; `"true"` and `"1"` are true.
/// Surrounding whitespace is ignored. Anything else is not a boolean.
pub fn boolean_from_text(text: &str) -> Option<bool> {
    match text.trim() {
        "" | "0" | "false" => Some(false),
        "1" | "true" => Some(true),
        _ => None,
    }
}

/// Maps a JSON value onto the canonical boolean sets.
///
/// `null`, `0`, `false` and the false texts of [`boolean_from_text`] are
/// false; `1`, `true` and the true texts are true. Arrays, objects and other
/// numbers are not booleans.
pub fn boolean_from_json(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Null => Some(false),
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(x) if x == 0.0 => Some(false),
            Some(x) if x == 1.0 => Some(true),
            Some(_) | None => None,
        },
        serde_json::Value::String(s) => boolean_from_text(s),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}
