//! Response projection.
//!
//! Folds a Platform API response into a record. The rules depend on each
//! attribute's flavor: configured values the server omits are preserved,
//! computed values are taken verbatim, secrets are never read back, and
//! nothing that was `Unknown` survives projection. Projecting the same
//! response into the same record twice yields the same record.

use serde_json::{Map, Value};
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::discriminator::Discriminator;
use crate::error::ProviderError;
use crate::kind::{Identity, ResourceKind};
use crate::reconcile::reconcile_set_order;
use crate::record::{join_path, value_type_name, Record};
use crate::schema::{Attribute, Block, BlockNestingMode, Flavor, NestedBlock};
use crate::value::{Attr, AttrValue, ENCRYPTED_SENTINEL};

/// The parts of a kind the projector needs.
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    /// The attribute table.
    pub block: &'a Block,
    /// Where the identifier lives, if the shape has one.
    pub identity: Option<&'a Identity>,
    /// The tagged-union rule, if any.
    pub discriminator: Option<&'a Discriminator>,
}

impl<'a> Shape<'a> {
    /// The shape of a resource kind.
    pub fn of(kind: &'a dyn ResourceKind) -> Self {
        let def = kind.definition();
        Self {
            block: &def.schema.block,
            identity: Some(&def.identity),
            discriminator: def.discriminator.as_ref(),
        }
    }

    /// A plain block with no identity.
    pub fn block(block: &'a Block) -> Self {
        Self {
            block,
            identity: None,
            discriminator: None,
        }
    }
}

/// Project a response into `record` for a resource kind.
///
/// When `require_identity` is set (after a create), a response without the
/// identity key is an error.
pub fn project_response(
    kind: &dyn ResourceKind,
    record: &mut Record,
    response: &Map<String, Value>,
    require_identity: bool,
    diags: &mut Diagnostics,
) -> Result<(), ProviderError> {
    project(Shape::of(kind), record, response, require_identity, diags)?;
    kind.after_projection(record, response);
    Ok(())
}

/// Project a response into `record` for an arbitrary shape.
pub fn project(
    shape: Shape<'_>,
    record: &mut Record,
    response: &Map<String, Value>,
    require_identity: bool,
    diags: &mut Diagnostics,
) -> Result<(), ProviderError> {
    if let Some(identity) = shape.identity {
        project_identity(identity, record, response, require_identity)?;
    }

    let skip = |name: &str| shape.identity.is_some_and(|identity| identity.covers(name));
    project_block(shape.block, record, response, "", &skip, diags);

    if let Some(discriminator) = shape.discriminator {
        discriminator.null_foreign_fields(record);
    }
    Ok(())
}

/// Project one element of a listing, with no prior state.
///
/// Every attribute the element does not carry ends up `Null`.
pub fn project_listing(
    shape: Shape<'_>,
    element: &Map<String, Value>,
    diags: &mut Diagnostics,
) -> Result<Record, ProviderError> {
    let mut record = Record::unknown_for(shape.block);
    project(shape, &mut record, element, false, diags)?;
    record.resolve_unknowns();
    Ok(record)
}

/// Read the identifier from a response into the identity attribute and its mirror.
fn project_identity(
    identity: &Identity,
    record: &mut Record,
    response: &Map<String, Value>,
    require: bool,
) -> Result<(), ProviderError> {
    let id = match response.get(identity.response_key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    match id {
        Some(id) => identity.assign(record, &id),
        None if require => {
            return Err(ProviderError::Sdk(format!(
                "response is missing the identity field '{}'",
                identity.response_key
            )))
        },
        None => {},
    }
    Ok(())
}

/// What a response says about one field.
enum Incoming<'v> {
    /// The key is missing, `null`, or holds the encrypted placeholder.
    Absent,
    /// The server reports the field as unset.
    Cleared,
    /// A concrete value.
    Present(&'v Value),
}

fn classify<'v>(value: Option<&'v Value>, empty_as_null: bool) -> Incoming<'v> {
    match value {
        None | Some(Value::Null) => Incoming::Absent,
        Some(Value::String(s)) if s == ENCRYPTED_SENTINEL => Incoming::Absent,
        Some(Value::String(s)) if s.is_empty() && empty_as_null => Incoming::Cleared,
        Some(v) => Incoming::Present(v),
    }
}

fn project_block(
    block: &Block,
    record: &mut Record,
    response: &Map<String, Value>,
    path: &str,
    skip: &dyn Fn(&str) -> bool,
    diags: &mut Diagnostics,
) {
    for (name, attr) in &block.attributes {
        if skip(name) {
            continue;
        }
        let attr_path = join_path(path, name);
        let prior = record.get(name).clone();
        let key = attr.api_name.as_deref().unwrap_or(name);
        let next = project_attribute(attr, prior, response.get(key), &attr_path, diags);
        record.set(name, next);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        let prior = record.get(name).clone();
        let key = nested.api_name.as_deref().unwrap_or(name);
        let next = project_nested(nested, prior, response.get(key), &block_path, diags);
        record.set(name, next);
    }
}

fn project_attribute(
    attr: &Attribute,
    prior: Attr<AttrValue>,
    incoming: Option<&Value>,
    path: &str,
    diags: &mut Diagnostics,
) -> Attr<AttrValue> {
    let flavor = attr.flavor();
    if matches!(flavor, Flavor::WriteOnly | Flavor::RequestOnly) {
        return prior.value_or_null();
    }

    match classify(incoming, attr.empty_as_null) {
        Incoming::Cleared => Attr::Null,
        Incoming::Absent => match flavor {
            Flavor::Computed if attr.retain_prior => prior.value_or_null(),
            Flavor::Computed => Attr::Null,
            _ => prior.value_or_null(),
        },
        Incoming::Present(value) => match AttrValue::from_json(&attr.attr_type, value) {
            Some(AttrValue::List(items)) => {
                if items.is_empty() && prior.is_null() && flavor != Flavor::Computed {
                    return Attr::Null;
                }
                let items = match (&prior, attr.preserves_order()) {
                    (Attr::Known(AttrValue::List(before)), true) => reconcile_set_order(before, items),
                    _ => items,
                };
                Attr::Known(AttrValue::List(items))
            },
            Some(decoded) => Attr::Known(decoded),
            None => {
                diags.warning(
                    path,
                    format!(
                        "the API returned {} for {}, which has an unexpected shape; treating it as unset",
                        value_type_name(value),
                        path
                    ),
                );
                Attr::Null
            },
        },
    }
}

fn project_nested(
    nested: &NestedBlock,
    prior: Attr<AttrValue>,
    incoming: Option<&Value>,
    path: &str,
    diags: &mut Diagnostics,
) -> Attr<AttrValue> {
    let incoming = match incoming {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    };

    match nested.nesting_mode {
        BlockNestingMode::Single => match incoming {
            Some(Value::Object(obj)) => {
                let mut record = match prior {
                    Attr::Known(AttrValue::Object(record)) => record,
                    _ => Record::unknown_for(&nested.block),
                };
                project_block(&nested.block, &mut record, obj, path, &|_: &str| false, diags);
                record.resolve_unknowns();
                Attr::Known(AttrValue::Object(record))
            },
            Some(other) => {
                diags.warning(
                    path,
                    format!("the API returned {} for {}, expected an object", value_type_name(other), path),
                );
                Attr::Null
            },
            None => preserve(prior, nested.flags.is_computed_only()),
        },
        BlockNestingMode::List => match incoming {
            Some(Value::Array(items)) if !items.is_empty() => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{path}.{i}");
                    let Value::Object(obj) = item else {
                        diags.warning(
                            &item_path,
                            format!("the API returned {} for {}, expected an object", value_type_name(item), item_path),
                        );
                        continue;
                    };
                    let mut record = Record::unknown_for(&nested.block);
                    project_block(&nested.block, &mut record, obj, &item_path, &|_: &str| false, diags);
                    record.resolve_unknowns();
                    out.push(AttrValue::Object(record));
                }
                Attr::Known(AttrValue::List(out))
            },
            Some(Value::Array(_)) => match prior {
                Attr::Known(AttrValue::List(before)) if !before.is_empty() => {
                    debug!(block = path, "server returned an empty list; keeping prior elements");
                    preserve(Attr::Known(AttrValue::List(before)), false)
                },
                Attr::Null => Attr::Null,
                _ => Attr::Known(AttrValue::List(Vec::new())),
            },
            Some(other) => {
                diags.warning(
                    path,
                    format!("the API returned {} for {}, expected a list", value_type_name(other), path),
                );
                Attr::Null
            },
            None => preserve(prior, nested.flags.is_computed_only()),
        },
    }
}

/// Keep a prior nested value when the server leaves the field out.
fn preserve(prior: Attr<AttrValue>, computed_only: bool) -> Attr<AttrValue> {
    if computed_only {
        return Attr::Null;
    }
    match prior {
        Attr::Known(mut value) => {
            value.resolve_unknowns();
            Attr::Known(value)
        },
        Attr::Null | Attr::Unknown => Attr::Null,
    }
}
