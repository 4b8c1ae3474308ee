//! The tri-state attribute model.
//!
//! Every attribute of a record is `Known`, `Null`, or `Unknown`. `Unknown`
//! marks a value the provider will compute during apply; it may appear in a
//! plan but never in persisted state.

use serde_json::{Map, Number, Value};

use crate::record::Record;
use crate::schema::AttributeType;

/// The string the host uses to encode an unknown value inside JSON.
pub const UNKNOWN_SENTINEL: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// The string the Platform API returns in place of a stored secret.
pub const ENCRYPTED_SENTINEL: &str = "<Value is encrypted>";

/// A value with one of three dispositions.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Attr<T> {
    /// A concrete value.
    Known(T),
    /// Explicitly absent.
    #[default]
    Null,
    /// Will be computed during apply.
    Unknown,
}

impl<T> Attr<T> {
    /// Whether the value is `Known`.
    pub fn is_known(&self) -> bool {
        matches!(self, Attr::Known(_))
    }

    /// Whether the value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    /// Whether the value is `Unknown`.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    /// Borrow the known value.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Consume into the known value.
    pub fn into_known(self) -> Option<T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Replace `Unknown` with `Null`, leaving the other dispositions untouched.
    pub fn value_or_null(self) -> Attr<T> {
        match self {
            Attr::Unknown => Attr::Null,
            other => other,
        }
    }

    /// Take the value out, leaving `Null` behind.
    pub fn take(&mut self) -> Attr<T> {
        std::mem::take(self)
    }

    /// Map the known value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attr<U> {
        match self {
            Attr::Known(v) => Attr::Known(f(v)),
            Attr::Null => Attr::Null,
            Attr::Unknown => Attr::Unknown,
        }
    }

    /// Borrow as `Attr<&T>`.
    pub fn as_ref(&self) -> Attr<&T> {
        match self {
            Attr::Known(v) => Attr::Known(v),
            Attr::Null => Attr::Null,
            Attr::Unknown => Attr::Unknown,
        }
    }
}

impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Attr::Known(v),
            None => Attr::Null,
        }
    }
}

/// The type-erased payload of a known attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A string.
    String(String),
    /// A 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A list of known values (scalars or nested objects).
    List(Vec<AttrValue>),
    /// A nested object.
    Object(Record),
}

impl AttrValue {
    /// Decode a JSON value of the given attribute type.
    ///
    /// Returns `None` when the JSON has the wrong shape. Integers that arrive
    /// as floating point are truncated.
    pub fn from_json(attr_type: &AttributeType, value: &Value) -> Option<AttrValue> {
        match attr_type {
            AttributeType::String => value.as_str().map(|s| AttrValue::String(s.to_string())),
            AttributeType::Int64 => match value.as_i64() {
                Some(i) => Some(AttrValue::Int(i)),
                None => value.as_f64().map(|f| AttrValue::Int(f.trunc() as i64)),
            },
            AttributeType::Float64 => value.as_f64().map(AttrValue::Float),
            AttributeType::Bool => value.as_bool().map(AttrValue::Bool),
            AttributeType::List(element) | AttributeType::Set(element) => value
                .as_array()?
                .iter()
                .map(|item| AttrValue::from_json(element, item))
                .collect::<Option<Vec<_>>>()
                .map(AttrValue::List),
        }
    }

    /// Borrow as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Read as a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Read as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a list.
    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a nested object.
    pub fn as_object(&self) -> Option<&Record> {
        match self {
            AttrValue::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Whether this is the empty string.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, AttrValue::String(s) if s.is_empty())
    }

    /// Render as JSON for the Platform API.
    ///
    /// Nested objects are rendered with host attribute names; the request
    /// builder re-keys them through their schema.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::Int(i) => Value::Number((*i).into()),
            AttrValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            AttrValue::Bool(b) => Value::Bool(*b),
            AttrValue::List(items) => Value::Array(items.iter().map(AttrValue::to_json).collect()),
            AttrValue::Object(record) => {
                let mut map = Map::new();
                for (name, attr) in record.iter() {
                    map.insert(name.clone(), attr_to_host_json(attr));
                }
                Value::Object(map)
            },
        }
    }

    /// Replace every `Unknown` nested inside this value with `Null`.
    pub fn resolve_unknowns(&mut self) {
        match self {
            AttrValue::List(items) => items.iter_mut().for_each(AttrValue::resolve_unknowns),
            AttrValue::Object(record) => record.resolve_unknowns(),
            _ => {},
        }
    }

    /// Whether any `Unknown` is nested inside this value.
    pub fn contains_unknown(&self) -> bool {
        match self {
            AttrValue::List(items) => items.iter().any(AttrValue::contains_unknown),
            AttrValue::Object(record) => !record.unknown_paths().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Record> for AttrValue {
    fn from(value: Record) -> Self {
        AttrValue::Object(value)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(value: Vec<T>) -> Self {
        AttrValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Encode an attribute for the host: `Null` is JSON null, `Unknown` is the
/// unknown sentinel.
pub fn attr_to_host_json(attr: &Attr<AttrValue>) -> Value {
    match attr {
        Attr::Known(v) => v.to_json(),
        Attr::Null => Value::Null,
        Attr::Unknown => Value::String(UNKNOWN_SENTINEL.to_string()),
    }
}
