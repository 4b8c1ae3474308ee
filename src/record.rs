//! Records: the tri-state representation of one resource instance.
//!
//! A [`Record`] maps attribute names to [`Attr`] values. Nested objects
//! are records themselves, so a record is always a tree. Records cross the
//! host boundary as JSON objects where `Null` is `null` and `Unknown` is the
//! host's unknown sentinel string.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::schema::{Block, BlockNestingMode};
use crate::value::{attr_to_host_json, Attr, AttrValue, UNKNOWN_SENTINEL};

static NULL_ATTR: Attr<AttrValue> = Attr::Null;

/// One resource instance (or nested object) in tri-state form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    attrs: BTreeMap<String, Attr<AttrValue>>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A record with every attribute of `block` set to `Null`.
    pub fn null_for(block: &Block) -> Self {
        let mut record = Self::new();
        for name in block.attributes.keys().chain(block.blocks.keys()) {
            record.set(name, Attr::Null);
        }
        record
    }

    /// A record with every attribute of `block` set to `Unknown`.
    ///
    /// Projecting a response into such a record applies "no prior state"
    /// semantics: anything the server leaves out becomes `Null`.
    pub fn unknown_for(block: &Block) -> Self {
        let mut record = Self::new();
        for name in block.attributes.keys().chain(block.blocks.keys()) {
            record.set(name, Attr::Unknown);
        }
        record
    }

    /// Builder-style setter for a known value.
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set_known(name, value);
        self
    }

    /// Builder-style setter for an arbitrary disposition.
    pub fn with_attr(mut self, name: &str, attr: Attr<AttrValue>) -> Self {
        self.set(name, attr);
        self
    }

    /// Get an attribute; missing attributes read as `Null`.
    pub fn get(&self, name: &str) -> &Attr<AttrValue> {
        self.attrs.get(name).unwrap_or(&NULL_ATTR)
    }

    /// Get a mutable attribute, inserting `Null` if missing.
    pub fn get_mut(&mut self, name: &str) -> &mut Attr<AttrValue> {
        self.attrs.entry(name.to_string()).or_default()
    }

    /// Set an attribute.
    pub fn set(&mut self, name: &str, attr: Attr<AttrValue>) {
        self.attrs.insert(name.to_string(), attr);
    }

    /// Set an attribute to a known value.
    pub fn set_known(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.set(name, Attr::Known(value.into()));
    }

    /// Set an attribute to `Null`.
    pub fn set_null(&mut self, name: &str) {
        self.set(name, Attr::Null);
    }

    /// Whether the attribute is known.
    pub fn is_known(&self, name: &str) -> bool {
        self.get(name).is_known()
    }

    /// Whether the attribute is known and not the empty string.
    pub fn is_set(&self, name: &str) -> bool {
        matches!(self.get(name), Attr::Known(v) if !v.is_empty_string())
    }

    /// The known string value of an attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).as_known().and_then(AttrValue::as_str)
    }

    /// The known integer value of an attribute.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).as_known().and_then(AttrValue::as_i64)
    }

    /// The known boolean value of an attribute.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).as_known().and_then(AttrValue::as_bool)
    }

    /// The known list value of an attribute.
    pub fn get_list(&self, name: &str) -> Option<&[AttrValue]> {
        self.get(name).as_known().and_then(AttrValue::as_list)
    }

    /// The known nested object of an attribute.
    pub fn get_object(&self, name: &str) -> Option<&Record> {
        self.get(name).as_known().and_then(AttrValue::as_object)
    }

    /// The known list of strings of an attribute.
    pub fn get_strings(&self, name: &str) -> Option<Vec<&str>> {
        self.get_list(name)
            .map(|items| items.iter().filter_map(AttrValue::as_str).collect())
    }

    /// Iterate over attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attr<AttrValue>)> {
        self.attrs.iter()
    }

    /// The number of attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the record holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Replace every `Unknown`, at any depth, with `Null`.
    pub fn resolve_unknowns(&mut self) {
        for attr in self.attrs.values_mut() {
            match attr {
                Attr::Unknown => *attr = Attr::Null,
                Attr::Known(value) => value.resolve_unknowns(),
                Attr::Null => {},
            }
        }
    }

    /// Dotted paths of every `Unknown` at any depth.
    pub fn unknown_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_unknowns("", &mut paths);
        paths
    }

    fn collect_unknowns(&self, prefix: &str, paths: &mut Vec<String>) {
        for (name, attr) in &self.attrs {
            let path = join_path(prefix, name);
            match attr {
                Attr::Unknown => paths.push(path),
                Attr::Known(AttrValue::Object(nested)) => nested.collect_unknowns(&path, paths),
                Attr::Known(AttrValue::List(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        if let AttrValue::Object(nested) = item {
                            nested.collect_unknowns(&format!("{path}.{i}"), paths);
                        }
                    }
                },
                _ => {},
            }
        }
    }

    /// Decode a host JSON object against `block`.
    ///
    /// Keys the block does not declare are ignored. A value of the wrong
    /// type is a validation error.
    pub fn from_host_json(block: &Block, value: &Value) -> Result<Record, ProviderError> {
        decode_block(block, value, "")
    }

    /// Encode for the host.
    pub fn to_host_json(&self) -> Value {
        let mut map = Map::new();
        for (name, attr) in &self.attrs {
            map.insert(name.clone(), attr_to_host_json(attr));
        }
        Value::Object(map)
    }
}

fn decode_block(block: &Block, value: &Value, path: &str) -> Result<Record, ProviderError> {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(Record::null_for(block)),
        other => {
            return Err(ProviderError::Validation(format!(
                "expected object at '{}', got {}",
                display_path(path),
                value_type_name(other)
            )))
        },
    };

    let mut record = Record::new();
    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        let decoded = match obj.get(name) {
            None | Some(Value::Null) => Attr::Null,
            Some(Value::String(s)) if s == UNKNOWN_SENTINEL => Attr::Unknown,
            Some(v) => match AttrValue::from_json(&attr.attr_type, v) {
                Some(value) => Attr::Known(value),
                None => {
                    return Err(ProviderError::Validation(format!(
                        "attribute '{}' has the wrong type: got {}",
                        attr_path,
                        value_type_name(v)
                    )))
                },
            },
        };
        record.set(name, decoded);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        let decoded = match obj.get(name) {
            None | Some(Value::Null) => Attr::Null,
            Some(Value::String(s)) if s == UNKNOWN_SENTINEL => Attr::Unknown,
            Some(v) => match nested.nesting_mode {
                BlockNestingMode::Single => {
                    Attr::Known(AttrValue::Object(decode_block(&nested.block, v, &block_path)?))
                },
                BlockNestingMode::List => {
                    let items = v.as_array().ok_or_else(|| {
                        ProviderError::Validation(format!(
                            "expected list for block '{}', got {}",
                            block_path,
                            value_type_name(v)
                        ))
                    })?;
                    let mut decoded = Vec::with_capacity(items.len());
                    for (i, item) in items.iter().enumerate() {
                        let item_path = format!("{block_path}.{i}");
                        decoded.push(AttrValue::Object(decode_block(
                            &nested.block,
                            item,
                            &item_path,
                        )?));
                    }
                    Attr::Known(AttrValue::List(decoded))
                },
            },
        };
        record.set(name, decoded);
    }

    Ok(record)
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
