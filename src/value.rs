//! Host values and declared type tokens.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A value in the caller's representation, before encoding or after decoding.
///
/// Arrays are heterogeneous and may nest. Values are assumed acyclic.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Int(i32),
    Float(f32),
    String(String),
    Bool(bool),
    Array(Vec<HostValue>),
    /// The host's absent value. Skipped inside encoded arrays; returned by void entry points.
    Null,
}

impl HostValue {
    /// Short name of the runtime kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::String(_) => "string",
            HostValue::Bool(_) => "bool",
            HostValue::Array(_) => "array",
            HostValue::Null => "null",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, HostValue::Int(_) | HostValue::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Int(v)
    }
}

impl From<f32> for HostValue {
    fn from(v: f32) -> Self {
        HostValue::Float(v)
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::String(v.to_string())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::String(v)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(items: Vec<T>) -> Self {
        HostValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(HostValue::Null, Into::into)
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Int(v) => write!(f, "{v}"),
            HostValue::Float(v) => write!(f, "{v:?}"),
            HostValue::String(s) => write!(f, "{s:?}"),
            HostValue::Bool(b) => write!(f, "{b}"),
            HostValue::Null => f.write_str("null"),
            HostValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A declared parameter or return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum ValueType {
    String,
    Int,
    Float,
    Bool,
    Array,
}

impl ValueType {
    /// The token used in declared signatures.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Array => "array",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type token outside the declared set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown type name '{0}' (expected string, int, float, bool or array)")]
pub struct ParseValueTypeError(pub String);

impl FromStr for ValueType {
    type Err = ParseValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueType::String),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "bool" => Ok(ValueType::Bool),
            "array" => Ok(ValueType::Array),
            other => Err(ParseValueTypeError(other.to_string())),
        }
    }
}

/// Errors converting external data into host values.
#[cfg(feature = "json")]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("JSON {0} values have no host representation")]
    UnsupportedJson(&'static str),

    #[error("Number {0} is not representable")]
    InvalidNumber(String),
}

#[cfg(feature = "json")]
impl TryFrom<serde_json::Value> for HostValue {
    type Error = ValueError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match json {
            Value::Null => Ok(HostValue::Null),
            Value::Bool(b) => Ok(HostValue::Bool(b)),
            Value::String(s) => Ok(HostValue::String(s)),
            Value::Number(n) => {
                if let Some(v) = n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                    Ok(HostValue::Int(v))
                } else if let Some(v) = n.as_f64() {
                    Ok(HostValue::Float(v as f32))
                } else {
                    Err(ValueError::InvalidNumber(n.to_string()))
                }
            }
            Value::Array(items) => items
                .into_iter()
                .map(HostValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(HostValue::Array),
            Value::Object(_) => Err(ValueError::UnsupportedJson("object")),
        }
    }
}

#[cfg(feature = "json")]
impl From<HostValue> for serde_json::Value {
    fn from(value: HostValue) -> Self {
        use serde_json::Value;

        match value {
            HostValue::Int(v) => Value::from(v),
            HostValue::Float(v) => serde_json::Number::from_f64(f64::from(v))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            HostValue::String(s) => Value::String(s),
            HostValue::Bool(b) => Value::Bool(b),
            HostValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            HostValue::Null => Value::Null,
        }
    }
}
