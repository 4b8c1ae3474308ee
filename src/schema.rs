//! Schema types for describing resource and data source structure.
//!
//! A schema names every attribute of a record once, together with the
//! flavor that governs how it moves between configuration, requests,
//! responses and state. The request builder, the response projector and
//! the plan pipeline are all driven from this one definition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string value.
    String,
    /// A 64-bit integer.
    Int64,
    /// A 64-bit floating point number.
    Float64,
    /// A boolean value.
    Bool,
    /// A list of values of a single type, kept in the order returned.
    List(Box<AttributeType>),
    /// An unordered collection, kept in state in the order configured.
    Set(Box<AttributeType>),
}

impl AttributeType {
    /// Create a list type.
    pub fn list(element_type: AttributeType) -> Self {
        Self::List(Box::new(element_type))
    }

    /// Create a set type.
    pub fn set(element_type: AttributeType) -> Self {
        Self::Set(Box::new(element_type))
    }

    /// The element type of a collection.
    pub fn element(&self) -> Option<&AttributeType> {
        match self {
            Self::List(inner) | Self::Set(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Describes how an attribute can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// The attribute is required in configuration.
    pub required: bool,
    /// The attribute is optional in configuration.
    pub optional: bool,
    /// The attribute is computed by the provider (read-only).
    pub computed: bool,
    /// The attribute is sensitive and should be hidden in logs/UI.
    pub sensitive: bool,
    /// The attribute is sent to the API but never read back from it.
    pub write_only: bool,
    /// The attribute is a request flag the API never echoes.
    pub request_only: bool,
}

impl AttributeFlags {
    /// Create flags for a required attribute.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Create flags for an optional attribute.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Create flags for a computed attribute (read-only, set by provider).
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// Create flags for an optional+computed attribute (can be set, but has default from provider).
    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Default::default()
        }
    }

    /// Mark the attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Whether the attribute is computed and cannot be configured.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// The reconciliation flavor of an attribute, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Always sent; projected verbatim.
    Required,
    /// Sent when set; preserved when the server omits it.
    Optional,
    /// Never sent; projected verbatim, `Null` when absent.
    Computed,
    /// Sent when known; the server's echo wins.
    OptionalComputed,
    /// Sent when known; never read from a response.
    WriteOnly,
    /// Sent; never interpreted from a response.
    RequestOnly,
}

/// Describes a single attribute in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The type of the attribute.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Flags describing how the attribute can be used.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// The Platform API field name. Derived from the attribute name when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
    /// Human-readable description of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// If set, changing this attribute forces resource replacement.
    #[serde(default)]
    pub force_new: bool,
    /// Default value for the attribute (JSON-encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// The server sends `""` to mean "unset".
    #[serde(default)]
    pub empty_as_null: bool,
    /// Only sent in create bodies.
    #[serde(default)]
    pub create_only: bool,
    /// Never sent in create bodies.
    #[serde(default)]
    pub omit_on_create: bool,
    /// Keep the prior known value when the server stops echoing it.
    #[serde(default)]
    pub retain_prior: bool,
    /// The server never populates this attribute when it is left unset.
    #[serde(default)]
    pub not_echoed: bool,
}

impl Attribute {
    /// Create a new attribute with the given type and flags.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            api_name: None,
            description: None,
            force_new: false,
            default: None,
            empty_as_null: false,
            create_only: false,
            omit_on_create: false,
            retain_prior: false,
            not_echoed: false,
        }
    }

    /// Create a required string attribute.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// Create an optional string attribute.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// Create a computed string attribute.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::computed())
    }

    /// Create an optional string attribute the server may default.
    pub fn optional_computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional_computed())
    }

    /// Create a required int64 attribute.
    pub fn required_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::required())
    }

    /// Create an optional int64 attribute.
    pub fn optional_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::optional())
    }

    /// Create a computed int64 attribute.
    pub fn computed_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::computed())
    }

    /// Create an optional int64 attribute the server may default.
    pub fn optional_computed_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::optional_computed())
    }

    /// Create a computed float64 attribute.
    pub fn computed_float64() -> Self {
        Self::new(AttributeType::Float64, AttributeFlags::computed())
    }

    /// Create a required bool attribute.
    pub fn required_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::required())
    }

    /// Create an optional bool attribute.
    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional())
    }

    /// Create a computed bool attribute.
    pub fn computed_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::computed())
    }

    /// Create an optional bool attribute the server may default.
    pub fn optional_computed_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional_computed())
    }

    /// Create a required list of strings.
    pub fn required_string_list() -> Self {
        Self::new(
            AttributeType::list(AttributeType::String),
            AttributeFlags::required(),
        )
    }

    /// Create an optional list of strings.
    pub fn optional_string_list() -> Self {
        Self::new(
            AttributeType::list(AttributeType::String),
            AttributeFlags::optional(),
        )
    }

    /// Create a computed list of strings.
    pub fn computed_string_list() -> Self {
        Self::new(
            AttributeType::list(AttributeType::String),
            AttributeFlags::computed(),
        )
    }

    /// Create a required set of strings.
    pub fn required_string_set() -> Self {
        Self::new(
            AttributeType::set(AttributeType::String),
            AttributeFlags::required(),
        )
    }

    /// Create an optional set of strings.
    pub fn optional_string_set() -> Self {
        Self::new(
            AttributeType::set(AttributeType::String),
            AttributeFlags::optional(),
        )
    }

    /// Create an optional set of strings the server may default.
    pub fn optional_computed_string_set() -> Self {
        Self::new(
            AttributeType::set(AttributeType::String),
            AttributeFlags::optional_computed(),
        )
    }

    /// Create a required write-only secret.
    pub fn required_secret() -> Self {
        let mut attr = Self::required_string().sensitive();
        attr.flags.write_only = true;
        attr
    }

    /// Create an optional write-only secret.
    pub fn optional_secret() -> Self {
        let mut attr = Self::optional_string().sensitive();
        attr.flags.write_only = true;
        attr
    }

    /// Create an optional request-only boolean flag.
    pub fn request_only_bool() -> Self {
        let mut attr = Self::optional_bool();
        attr.flags.request_only = true;
        attr
    }

    /// Set the description for this attribute.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark this attribute as forcing resource replacement when changed.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Set a default value for this attribute.
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Override the Platform API field name.
    pub fn with_api_name(mut self, api_name: impl Into<String>) -> Self {
        self.api_name = Some(api_name.into());
        self
    }

    /// Mark this attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }

    /// Treat `""` from the server as `Null`.
    pub fn empty_as_null(mut self) -> Self {
        self.empty_as_null = true;
        self
    }

    /// Only send this attribute when creating.
    pub fn create_only(mut self) -> Self {
        self.create_only = true;
        self
    }

    /// Never send this attribute when creating.
    pub fn omit_on_create(mut self) -> Self {
        self.omit_on_create = true;
        self
    }

    /// Keep the prior known value when the server omits the field.
    pub fn retain_prior(mut self) -> Self {
        self.retain_prior = true;
        self
    }

    /// The server leaves this attribute absent when it is not configured.
    pub fn not_echoed(mut self) -> Self {
        self.not_echoed = true;
        self
    }

    /// The reconciliation flavor of this attribute.
    pub fn flavor(&self) -> Flavor {
        if self.flags.write_only {
            Flavor::WriteOnly
        } else if self.flags.request_only {
            Flavor::RequestOnly
        } else if self.flags.required {
            Flavor::Required
        } else if self.flags.optional && self.flags.computed {
            Flavor::OptionalComputed
        } else if self.flags.optional {
            Flavor::Optional
        } else {
            Flavor::Computed
        }
    }

    /// Whether the attribute keeps configuration order regardless of server order.
    pub fn preserves_order(&self) -> bool {
        matches!(self.attr_type, AttributeType::Set(_))
    }
}

/// The nesting mode for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockNestingMode {
    /// A single nested object (at most one).
    #[default]
    Single,
    /// A list of nested objects (zero or more, ordered).
    List,
}

/// A nested object type within a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Block {
    /// The attributes within this block.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,
    /// Nested blocks within this block.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, NestedBlock>,
    /// Human-readable description of the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Block {
    /// Create a new empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute to this block.
    pub fn with_attribute(mut self, name: impl Into<String>, mut attr: Attribute) -> Self {
        let name = name.into();
        if attr.api_name.is_none() {
            attr.api_name = Some(to_camel_case(&name));
        }
        self.attributes.insert(name, attr);
        self
    }

    /// Add a nested block to this block.
    pub fn with_block(mut self, name: impl Into<String>, mut block: NestedBlock) -> Self {
        let name = name.into();
        if block.api_name.is_none() {
            block.api_name = Some(to_camel_case(&name));
        }
        self.blocks.insert(name, block);
        self
    }

    /// Set the description for this block.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Look up a nested block by name.
    pub fn nested(&self, name: &str) -> Option<&NestedBlock> {
        self.blocks.get(name)
    }

    /// Whether the block declares `name` as an attribute or a nested block.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name) || self.blocks.contains_key(name)
    }

    /// A copy of this block where every attribute is computed.
    ///
    /// Used to describe data source results, which are never configured.
    pub fn to_computed(&self) -> Block {
        Block {
            attributes: self
                .attributes
                .iter()
                .map(|(name, attr)| {
                    let mut attr = attr.clone();
                    attr.flags = AttributeFlags {
                        sensitive: attr.flags.sensitive,
                        write_only: attr.flags.write_only,
                        ..AttributeFlags::computed()
                    };
                    attr.force_new = false;
                    attr.default = None;
                    (name.clone(), attr)
                })
                .collect(),
            blocks: self
                .blocks
                .iter()
                .map(|(name, nested)| {
                    let mut nested = nested.clone();
                    nested.block = nested.block.to_computed();
                    nested.flags = AttributeFlags::computed();
                    nested.min_items = 0;
                    (name.clone(), nested)
                })
                .collect(),
            description: self.description.clone(),
        }
    }
}

/// A nested block with its nesting mode and constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// The block definition.
    #[serde(flatten)]
    pub block: Block,
    /// How the block is nested (single or list).
    #[serde(default)]
    pub nesting_mode: BlockNestingMode,
    /// How the block is configured.
    #[serde(default)]
    pub flags: AttributeFlags,
    /// The Platform API field name. Derived from the block name when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
    /// Minimum number of blocks required.
    #[serde(default)]
    pub min_items: u32,
    /// Maximum number of blocks allowed (0 = unlimited).
    #[serde(default)]
    pub max_items: u32,
}

impl NestedBlock {
    /// Create a single nested block (0 or 1 allowed).
    pub fn single(block: Block) -> Self {
        Self {
            block,
            nesting_mode: BlockNestingMode::Single,
            flags: AttributeFlags::optional(),
            api_name: None,
            min_items: 0,
            max_items: 1,
        }
    }

    /// Create a list of nested blocks.
    pub fn list(block: Block) -> Self {
        Self {
            block,
            nesting_mode: BlockNestingMode::List,
            flags: AttributeFlags::optional(),
            api_name: None,
            min_items: 0,
            max_items: 0,
        }
    }

    /// Set the minimum number of blocks required.
    pub fn with_min_items(mut self, min: u32) -> Self {
        self.min_items = min;
        if min > 0 {
            self.flags = AttributeFlags::required();
        }
        self
    }

    /// Set the maximum number of blocks allowed.
    pub fn with_max_items(mut self, max: u32) -> Self {
        self.max_items = max;
        self
    }

    /// Mark the block as computed by the server.
    pub fn computed(mut self) -> Self {
        self.flags = AttributeFlags::computed();
        self
    }

    /// Mark the block as optional with a server default.
    pub fn optional_computed(mut self) -> Self {
        self.flags = AttributeFlags::optional_computed();
        self
    }

    /// Override the Platform API field name.
    pub fn with_api_name(mut self, api_name: impl Into<String>) -> Self {
        self.api_name = Some(api_name.into());
        self
    }
}

/// Schema for a resource or data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The version of this schema (for state upgrades).
    #[serde(default)]
    pub version: u64,
    /// The root block containing all attributes and nested blocks.
    #[serde(flatten)]
    pub block: Block,
}

impl Schema {
    /// Create a new schema with the given version.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            block: Block::new(),
        }
    }

    /// Create a schema at version 0.
    pub fn v0() -> Self {
        Self::new(0)
    }

    /// Add an attribute to the schema.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block = self.block.with_attribute(name, attr);
        self
    }

    /// Add a nested block to the schema.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block = self.block.with_block(name, block);
        self
    }

    /// Set the description of the root block.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.block.description = Some(description.into());
        self
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::v0()
    }
}

/// Schema for the provider configuration, resources and data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Schema for provider configuration.
    #[serde(default)]
    pub provider: Schema,
    /// Schemas for each resource type.
    #[serde(default)]
    pub resources: BTreeMap<String, Schema>,
    /// Schemas for each data source type.
    #[serde(default)]
    pub data_sources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// Create a new empty provider schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider configuration schema.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Add a resource schema.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Add a data source schema.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

/// Convert a snake_case attribute name to the API's camelCase.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
