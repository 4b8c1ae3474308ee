//! Request body construction.
//!
//! A request body is derived from a planned record and the kind's schema.
//! Only known, non-empty values are ever written: `Null` and `Unknown`
//! never reach the wire, so the API never sees a JSON `null` or an empty
//! string it would interpret as a reset.

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::kind::{Operation, ResourceKind};
use crate::record::{join_path, Record};
use crate::schema::{Attribute, Block, BlockNestingMode, Flavor, NestedBlock};
use crate::value::{Attr, AttrValue};

/// Build the JSON body for `op` from a planned record.
///
/// Discriminated kinds only emit the fields of the selected variant. When
/// a mutual-exclusion rule fires, the subordinate fields are stripped and a
/// warning is recorded. The kind's `customize_request` hook runs last.
pub fn build_request(
    kind: &dyn ResourceKind,
    record: &Record,
    op: Operation,
    diags: &mut Diagnostics,
) -> Result<Map<String, Value>, ProviderError> {
    let def = kind.definition();
    let variant = match &def.discriminator {
        Some(discriminator) => Some((discriminator, discriminator.require(record)?)),
        None => None,
    };

    let in_variant = |name: &str| match variant {
        Some((discriminator, selected)) => discriminator.allows(selected, name),
        None => true,
    };

    let mut body = build_block(&def.schema.block, record, op, "", &in_variant)?;

    for exclusion in &def.exclusions {
        if !exclusion.dominant_present(record) {
            continue;
        }
        for &name in exclusion.subordinate {
            let key = def
                .schema
                .block
                .attribute(name)
                .map(|attr| api_key(attr, name))
                .unwrap_or(name);
            if body.remove(key).is_some() {
                diags.warning(
                    name,
                    format!("{} was not sent because {} is set", name, exclusion.dominant.join(" / ")),
                );
            }
        }
    }

    kind.customize_request(record, &mut body, op);
    Ok(body)
}

/// Whether a record holds values that a create body leaves out.
///
/// Such values are applied by an update immediately after creation.
pub fn has_deferred_fields(kind: &dyn ResourceKind, record: &Record) -> bool {
    kind.definition()
        .schema
        .block
        .attributes
        .iter()
        .any(|(name, attr)| attr.omit_on_create && record.is_set(name))
}

fn build_block(
    block: &Block,
    record: &Record,
    op: Operation,
    path: &str,
    in_variant: &dyn Fn(&str) -> bool,
) -> Result<Map<String, Value>, ProviderError> {
    let mut body = Map::new();

    for (name, attr) in &block.attributes {
        if attr.flags.is_computed_only() || !in_variant(name) || !sent_for(attr, op) {
            continue;
        }
        let attr_path = join_path(path, name);
        let value = record.get(name);

        if attr.flags.required {
            match value {
                Attr::Known(v) if attr.flavor() == Flavor::WriteOnly && v.is_empty_string() => {
                    return Err(ProviderError::Configuration(format!(
                        "{attr_path} must not be empty"
                    )));
                },
                Attr::Known(v) => {
                    body.insert(api_key(attr, name).to_string(), v.to_json());
                },
                Attr::Null | Attr::Unknown => {
                    return Err(ProviderError::Configuration(format!(
                        "{attr_path} is required"
                    )));
                },
            }
            continue;
        }

        if let Attr::Known(v) = value {
            if !v.is_empty_string() {
                body.insert(api_key(attr, name).to_string(), v.to_json());
            }
        }
    }

    for (name, nested) in &block.blocks {
        if nested.flags.is_computed_only() || !in_variant(name) {
            continue;
        }
        let block_path = join_path(path, name);
        let key = nested.api_name.as_deref().unwrap_or(name).to_string();
        match record.get(name) {
            Attr::Known(value) => {
                let built = build_nested(nested, value, op, &block_path)?;
                body.insert(key, built);
            },
            Attr::Null | Attr::Unknown if nested.flags.required => {
                return Err(ProviderError::Configuration(format!(
                    "{block_path} is required"
                )));
            },
            Attr::Null | Attr::Unknown => {},
        }
    }

    Ok(body)
}

fn build_nested(
    nested: &NestedBlock,
    value: &AttrValue,
    op: Operation,
    path: &str,
) -> Result<Value, ProviderError> {
    let all = |_: &str| true;
    match (nested.nesting_mode, value) {
        (BlockNestingMode::Single, AttrValue::Object(record)) => {
            Ok(Value::Object(build_block(&nested.block, record, op, path, &all)?))
        },
        (BlockNestingMode::List, AttrValue::List(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}.{i}");
                let record = item.as_object().ok_or_else(|| {
                    ProviderError::Configuration(format!("{item_path} must be an object"))
                })?;
                out.push(Value::Object(build_block(&nested.block, record, op, &item_path, &all)?));
            }
            Ok(Value::Array(out))
        },
        _ => Err(ProviderError::Configuration(format!(
            "{path} does not match its block shape"
        ))),
    }
}

fn sent_for(attr: &Attribute, op: Operation) -> bool {
    match op {
        Operation::Create => !attr.omit_on_create,
        Operation::Update => !attr.create_only,
    }
}

fn api_key<'a>(attr: &'a Attribute, name: &'a str) -> &'a str {
    attr.api_name.as_deref().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discriminator::{Discriminator, Variant};
    use crate::kind::{Identity, KindDefinition};
    use crate::plan::MutualExclusion;
    use crate::schema::Schema;
    use crate::transport::ApiPath;
    use serde_json::json;

    #[derive(Debug, Clone, Copy)]
    enum Store {
        Managed,
        External,
    }

    impl Variant for Store {
        const ATTRIBUTE: &'static str = "store_type";

        fn all() -> &'static [Self] {
            &[Store::Managed, Store::External]
        }

        fn name(&self) -> &'static str {
            match self {
                Store::Managed => "managed",
                Store::External => "external",
            }
        }

        fn fields(&self) -> &'static [&'static str] {
            match self {
                Store::Managed => &["bucket"],
                Store::External => &["host"],
            }
        }
    }

    struct Bucket(KindDefinition);

    impl ResourceKind for Bucket {
        fn definition(&self) -> &KindDefinition {
            &self.0
        }

        fn customize_request(&self, _plan: &Record, body: &mut Map<String, Value>, op: Operation) {
            if op == Operation::Create {
                body.insert("origin".into(), json!("provider"));
            }
        }
    }

    fn bucket() -> Bucket {
        let schema = Schema::v0()
            .with_attribute("id", Attribute::computed_string().with_api_name("bucketId"))
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute("store_type", Attribute::required_string())
            .with_attribute("bucket", Attribute::optional_string())
            .with_attribute("host", Attribute::optional_string())
            .with_attribute("role_arn", Attribute::optional_string())
            .with_attribute("access_key", Attribute::optional_string())
            .with_attribute("secret_key", Attribute::optional_secret())
            .with_attribute("password", Attribute::required_secret())
            .with_attribute("tier", Attribute::optional_computed_string())
            .with_attribute("grant_to_creator", Attribute::request_only_bool().create_only())
            .with_attribute("warehouse", Attribute::optional_string().omit_on_create())
            .with_block(
                "scopes",
                NestedBlock::list(
                    Block::new()
                        .with_attribute("entity_id", Attribute::required_string())
                        .with_attribute("schema_name", Attribute::optional_string())
                        .with_block(
                            "privileges",
                            NestedBlock::single(
                                Block::new()
                                    .with_attribute("grant_kind", Attribute::required_string())
                                    .with_attribute("privilege", Attribute::required_string_list()),
                            ),
                        ),
                ),
            );
        Bucket(
            KindDefinition::new("bucket", ApiPath::new("/bucket"), Identity::plain("bucketId"), schema)
                .with_discriminator(Discriminator::of::<Store>())
                .with_exclusion(MutualExclusion::new(&["role_arn"], &["access_key", "secret_key"])),
        )
    }

    fn base() -> Record {
        Record::new()
            .with_attr("id", Attr::Unknown)
            .with("name", "b1")
            .with("store_type", "managed")
            .with("password", "pw")
    }

    #[test]
    fn test_omits_null_unknown_and_empty() {
        let record = base()
            .with("bucket", "")
            .with_attr("host", Attr::Unknown)
            .with_attr("tier", Attr::Unknown);
        let body = build_request(&bucket(), &record, Operation::Create, &mut Diagnostics::new()).unwrap();

        assert_eq!(
            Value::Object(body),
            json!({"name": "b1", "storeType": "managed", "password": "pw", "origin": "provider"})
        );
    }

    #[test]
    fn test_variant_scoping() {
        let record = base().with("bucket", "lake").with("host", "meta.example.com");
        let body = build_request(&bucket(), &record, Operation::Create, &mut Diagnostics::new()).unwrap();
        assert_eq!(body["bucket"], json!("lake"));
        assert!(!body.contains_key("host"));
    }

    #[test]
    fn test_exclusion_strips_subordinate_with_warning() {
        let record = base()
            .with("role_arn", "arn:aws:iam::1:role/r")
            .with("access_key", "AK")
            .with("secret_key", "SK");
        let mut diags = Diagnostics::new();
        let body = build_request(&bucket(), &record, Operation::Create, &mut diags).unwrap();

        assert_eq!(body["roleArn"], json!("arn:aws:iam::1:role/r"));
        assert!(!body.contains_key("accessKey"));
        assert!(!body.contains_key("secretKey"));
        assert_eq!(diags.len(), 2);
        assert!(!diags.has_errors());
    }

    #[test]
    fn test_required_missing_is_an_error() {
        let record = base().with_attr("name", Attr::Null);
        let err = build_request(&bucket(), &record, Operation::Create, &mut Diagnostics::new())
            .unwrap_err();
        assert!(err.message().contains("name is required"));
    }

    #[test]
    fn test_empty_required_secret_is_an_error() {
        let record = base().with("password", "");
        let err = build_request(&bucket(), &record, Operation::Create, &mut Diagnostics::new())
            .unwrap_err();
        assert!(err.message().contains("password must not be empty"));
    }

    #[test]
    fn test_unresolved_discriminator_is_an_error() {
        let record = base().with_attr("store_type", Attr::Null);
        assert!(build_request(&bucket(), &record, Operation::Create, &mut Diagnostics::new()).is_err());
    }

    #[test]
    fn test_create_only_and_omit_on_create() {
        let record = base().with("grant_to_creator", true).with("warehouse", "wh");
        let create = build_request(&bucket(), &record, Operation::Create, &mut Diagnostics::new()).unwrap();
        assert_eq!(create["grantToCreator"], json!(true));
        assert!(!create.contains_key("warehouse"));

        let update = build_request(&bucket(), &record, Operation::Update, &mut Diagnostics::new()).unwrap();
        assert!(!update.contains_key("grantToCreator"));
        assert_eq!(update["warehouse"], json!("wh"));
        assert!(!update.contains_key("origin"));
        assert!(has_deferred_fields(&bucket(), &record));
    }

    #[test]
    fn test_nested_blocks_use_api_names() {
        let scope = Record::new()
            .with("entity_id", "c1")
            .with_attr("schema_name", Attr::Null)
            .with(
                "privileges",
                Record::new()
                    .with("grant_kind", "Allow")
                    .with("privilege", vec!["SELECT"]),
            );
        let record = base().with("scopes", vec![scope]);
        let body = build_request(&bucket(), &record, Operation::Create, &mut Diagnostics::new()).unwrap();
        assert_eq!(
            body["scopes"],
            json!([{"entityId": "c1", "privileges": {"grantKind": "Allow", "privilege": ["SELECT"]}}])
        );
    }

    #[test]
    fn test_nested_required_missing_is_an_error() {
        let scope = Record::new().with("privileges", Record::new().with("grant_kind", "Allow"));
        let record = base().with("scopes", vec![scope]);
        let err = build_request(&bucket(), &record, Operation::Create, &mut Diagnostics::new())
            .unwrap_err();
        assert!(err.message().contains("scopes.0.entity_id is required"));
    }
}
