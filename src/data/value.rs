//! Generic value model for instance data.

use super::container::ScimData;

use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// A value stored in a [`ScimData`] container.
///
/// Mirrors the JSON value model with two extra sentinels: `Missing` marks an
/// absent value (returned by lookups that resolve nothing) and `Invalid`
/// marks an element rejected during validation so later steps skip it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DataValue {
    #[default]
    Missing,
    Invalid,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<DataValue>),
    Data(ScimData),
}

impl DataValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, DataValue::Missing)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, DataValue::Invalid)
    }

    /// True for `Missing` and `Null`, the two forms of "no value".
    pub fn is_absent(&self) -> bool {
        matches!(self, DataValue::Missing | DataValue::Null)
    }

    /// JSON-style truthiness: empty strings, lists and containers, zero, false
    /// and the sentinels are all falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            DataValue::Missing | DataValue::Invalid | DataValue::Null => false,
            DataValue::Bool(value) => *value,
            DataValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
            DataValue::String(value) => !value.is_empty(),
            DataValue::List(items) => !items.is_empty(),
            DataValue::Data(data) => !data.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            DataValue::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<DataValue>> {
        match self {
            DataValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&ScimData> {
        match self {
            DataValue::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_data_mut(&mut self) -> Option<&mut ScimData> {
        match self {
            DataValue::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Short name of the value kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DataValue::Missing => "missing",
            DataValue::Invalid => "invalid",
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Number(_) => "number",
            DataValue::String(_) => "string",
            DataValue::List(_) => "list",
            DataValue::Data(_) => "complex",
        }
    }

    /// Convert back to a plain JSON value. Sentinels become `null`.
    pub fn to_plain(&self) -> Value {
        match self {
            DataValue::Missing | DataValue::Invalid | DataValue::Null => Value::Null,
            DataValue::Bool(value) => Value::Bool(*value),
            DataValue::Number(number) => Value::Number(number.clone()),
            DataValue::String(value) => Value::String(value.clone()),
            DataValue::List(items) => Value::Array(items.iter().map(DataValue::to_plain).collect()),
            DataValue::Data(data) => data.to_plain(),
        }
    }
}

impl From<Value> for DataValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DataValue::Null,
            Value::Bool(value) => DataValue::Bool(value),
            Value::Number(number) => DataValue::Number(number),
            Value::String(value) => DataValue::String(value),
            Value::Array(items) => DataValue::List(items.into_iter().map(DataValue::from).collect()),
            Value::Object(map) => DataValue::Data(ScimData::from_mapping(map)),
        }
    }
}

impl From<&DataValue> for Value {
    fn from(value: &DataValue) -> Self {
        value.to_plain()
    }
}

impl From<ScimData> for DataValue {
    fn from(value: ScimData) -> Self {
        DataValue::Data(value)
    }
}

impl From<Vec<DataValue>> for DataValue {
    fn from(value: Vec<DataValue>) -> Self {
        DataValue::List(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Number(value.into())
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl PartialEq<Value> for DataValue {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (DataValue::Null, Value::Null) => true,
            (DataValue::Bool(a), Value::Bool(b)) => a == b,
            (DataValue::Number(a), Value::Number(b)) => a == b,
            (DataValue::String(a), Value::String(b)) => a == b,
            (DataValue::List(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a == b)
            }
            (DataValue::Data(a), Value::Object(b)) => *a == ScimData::from_mapping(b.clone()),
            _ => false,
        }
    }
}

impl Serialize for DataValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_plain().serialize(serializer)
    }
}
