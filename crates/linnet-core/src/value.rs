//! Field values carried by nodes and stored rows.
//!
//! A node is a mapping from field name to a small closed set of variants
//! rather than arbitrary JSON, so the generator and the filter engine can
//! dispatch on [`ScalarKind`] exhaustively.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered field map used for node payloads and raw store attributes.
pub type Fields = IndexMap<String, Value>;

/// A single field value.
///
/// Serializes untagged, so a `Value` round-trips through JSON as the plain
/// JSON scalar, array, or object it represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// UTF-8 string value.
    String(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested object.
    Node(Fields),
}

/// Runtime kind of a [`Value`], used for filter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `Value::Bool`.
    Bool,
    /// `Value::Int`.
    Int,
    /// `Value::Float`.
    Float,
    /// `Value::String`.
    String,
    /// `Value::List`.
    List,
    /// `Value::Node`.
    Node,
}

impl Value {
    /// Returns the runtime kind of this value.
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) => ScalarKind::Int,
            Self::Float(_) => ScalarKind::Float,
            Self::String(_) => ScalarKind::String,
            Self::List(_) => ScalarKind::List,
            Self::Node(_) => ScalarKind::Node,
        }
    }

    /// Converts a JSON value, dropping `null`s at every depth.
    ///
    /// Returns `None` when the value itself is `null`. Unsigned integers that
    /// do not fit in `i64` become floats.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Self::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::String(s)),
            serde_json::Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            serde_json::Value::Object(map) => Some(Self::Node(fields_from_json(map))),
        }
    }

    /// Converts this value back into JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Node(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Returns the string slice if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns a numeric view of integers and floats.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Reason: filter comparisons across int/float operands
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the nested fields if this is an object.
    #[must_use]
    pub fn as_node(&self) -> Option<&Fields> {
        match self {
            Self::Node(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Converts a JSON object into [`Fields`], dropping `null` entries.
#[must_use]
pub fn fields_from_json(map: serde_json::Map<String, serde_json::Value>) -> Fields {
    map.into_iter()
        .filter_map(|(k, v)| Value::from_json(v).map(|v| (k, v)))
        .collect()
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Fields> for Value {
    fn from(value: Fields) -> Self {
        Self::Node(value)
    }
}
