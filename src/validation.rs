//! Configuration validation.
//!
//! Checks a host configuration object against a [`Schema`] before it is
//! planned. Values not yet known to the host arrive as the unknown sentinel
//! and are accepted for every attribute type.
//!
//! # Example
//!
//! ```
//! use galaxy_provider::schema::{Attribute, Schema};
//! use galaxy_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("min_workers", Attribute::optional_int64());
//!
//! let diagnostics = validate(&schema, &json!({"name": "etl", "min_workers": 1}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "etl", "min_workers": "one"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("min_workers".to_string()));
//! ```

use serde_json::Value;

use crate::diagnostics::Diagnostic;
use crate::record::{join_path, value_type_name};
use crate::schema::{Attribute, AttributeType, Block, BlockNestingMode, NestedBlock, Schema};
use crate::value::UNKNOWN_SENTINEL;

/// Validate a configuration object against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Required secrets must not be empty
/// - Computed-only attributes must not be configured
/// - Attribute types must match the schema
/// - Nested blocks are validated recursively with min/max item constraints
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Validate a configuration object, returning Ok if valid or Err with diagnostics.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a configuration object is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn is_unknown(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == UNKNOWN_SENTINEL)
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        v if is_unknown(v) => return,
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value)))
                    .with_attribute_if_not_empty(path),
            );
            return;
        },
    };

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        validate_nested_block(nested, obj.get(name), &block_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(_) if attr.flags.is_computed_only() => {
            diagnostics.push(
                Diagnostic::error(format!("Attribute '{}' cannot be set", path))
                    .with_detail("This attribute is computed by the server")
                    .with_attribute(path),
            );
        },
        Some(v) if is_unknown(v) => {},
        Some(Value::String(s)) if s.is_empty() && attr.flags.required && attr.flags.write_only => {
            diagnostics.push(
                Diagnostic::error(format!("Attribute '{}' must not be empty", path))
                    .with_attribute(path),
            );
        },
        Some(v) => validate_attribute_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if is_unknown(value) {
        return;
    }
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if !is_int64(value) {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::Float64 => {
            if !value.is_number() {
                diagnostics.push(type_error(path, "float64", value));
            }
        },
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        },
        AttributeType::List(element_type) | AttributeType::Set(element_type) => {
            let expected = if matches!(attr_type, AttributeType::Set(_)) {
                "set"
            } else {
                "list"
            };
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, expected, value));
            }
        },
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if nested.flags.is_computed_only() {
        if value.is_some_and(|v| !v.is_null()) {
            diagnostics.push(
                Diagnostic::error(format!("Block '{}' cannot be set", path))
                    .with_detail("This block is computed by the server")
                    .with_attribute(path),
            );
        }
        return;
    }
    match nested.nesting_mode {
        BlockNestingMode::Single => validate_single_block(nested, value, path, diagnostics),
        BlockNestingMode::List => validate_list_block(nested, value, path, diagnostics),
    }
}

fn validate_single_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if nested.min_items > 0 {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required block '{}'", path))
                        .with_detail("At least one block is required")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => validate_block(&nested.block, v, path, diagnostics),
    }
}

fn validate_list_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if nested.min_items > 0 {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' requires at least {} item(s)",
                        path, nested.min_items
                    ))
                    .with_attribute(path),
                );
            }
        },
        Some(v) if is_unknown(v) => {},
        Some(Value::Array(arr)) => {
            let len = arr.len() as u32;

            if len < nested.min_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' requires at least {} item(s), got {}",
                        path, nested.min_items, len
                    ))
                    .with_attribute(path),
                );
            }

            // 0 means unlimited
            if nested.max_items > 0 && len > nested.max_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' allows at most {} item(s), got {}",
                        path, nested.max_items, len
                    ))
                    .with_attribute(path),
                );
            }

            for (i, item) in arr.iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                validate_block(&nested.block, item, &item_path, diagnostics);
            }
        },
        Some(v) => {
            diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", value_type_name(v)))
                    .with_attribute(path),
            );
        },
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64()
                || n.as_f64()
                    .is_some_and(|f| f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64)
        },
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NestedBlock;
    use serde_json::json;

    #[test]
    fn test_validate_required_string() {
        let schema = Schema::v0().with_attribute("name", Attribute::required_string());

        let diagnostics = validate(&schema, &json!({"name": "test"}));
        assert!(diagnostics.is_empty());

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));

        let diagnostics = validate(&schema, &json!({"name": null}));
        assert_eq!(diagnostics.len(), 1);

        let diagnostics = validate(&schema, &json!({"name": 123}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_unknown_sentinel() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("max_workers", Attribute::required_int64())
            .with_attribute("read_only", Attribute::optional_bool());

        let diagnostics = validate(
            &schema,
            &json!({
                "name": UNKNOWN_SENTINEL,
                "max_workers": UNKNOWN_SENTINEL,
                "read_only": UNKNOWN_SENTINEL,
            }),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_validate_optional_attribute() {
        let schema = Schema::v0().with_attribute("count", Attribute::optional_int64());

        assert!(validate(&schema, &json!({"count": 42})).is_empty());
        assert!(validate(&schema, &json!({})).is_empty());
        assert!(validate(&schema, &json!({"count": null})).is_empty());
        assert_eq!(validate(&schema, &json!({"count": "not a number"})).len(), 1);
    }

    #[test]
    fn test_validate_computed_attribute_rejected() {
        let schema = Schema::v0().with_attribute("cluster_id", Attribute::computed_string());

        assert!(validate(&schema, &json!({})).is_empty());
        assert!(validate(&schema, &json!({"cluster_id": null})).is_empty());

        let diagnostics = validate(&schema, &json!({"cluster_id": "w-1"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("cannot be set"));
    }

    #[test]
    fn test_validate_optional_computed_accepted() {
        let schema =
            Schema::v0().with_attribute("region", Attribute::optional_computed_string());

        assert!(validate(&schema, &json!({"region": "us-east1"})).is_empty());
        assert!(validate(&schema, &json!({})).is_empty());
    }

    #[test]
    fn test_validate_empty_secret() {
        let schema = Schema::v0().with_attribute("password", Attribute::required_secret());

        assert!(validate(&schema, &json!({"password": "s3cret"})).is_empty());

        let diagnostics = validate(&schema, &json!({"password": ""}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("must not be empty"));
    }

    #[test]
    fn test_validate_int64() {
        let schema = Schema::v0().with_attribute("count", Attribute::required_int64());

        assert!(validate(&schema, &json!({"count": 42})).is_empty());
        assert!(validate(&schema, &json!({"count": 42.0})).is_empty());
        assert_eq!(validate(&schema, &json!({"count": 42.5})).len(), 1);
        assert_eq!(validate(&schema, &json!({"count": "42"})).len(), 1);
    }

    #[test]
    fn test_validate_bool() {
        let schema = Schema::v0().with_attribute("enabled", Attribute::required_bool());

        assert!(validate(&schema, &json!({"enabled": true})).is_empty());
        assert!(validate(&schema, &json!({"enabled": false})).is_empty());
        assert_eq!(validate(&schema, &json!({"enabled": "true"})).len(), 1);
    }

    #[test]
    fn test_validate_list() {
        let schema = Schema::v0().with_attribute("tags", Attribute::required_string_list());

        assert!(validate(&schema, &json!({"tags": ["a", "b", "c"]})).is_empty());
        assert!(validate(&schema, &json!({"tags": []})).is_empty());

        let diagnostics = validate(&schema, &json!({"tags": ["a", 123, "c"]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("tags.1".to_string()));

        assert_eq!(validate(&schema, &json!({"tags": "not a list"})).len(), 1);
    }

    #[test]
    fn test_validate_set() {
        let schema = Schema::v0().with_attribute("role_ids", Attribute::optional_string_set());

        assert!(validate(&schema, &json!({"role_ids": ["r-1", "r-2"]})).is_empty());
        let diagnostics = validate(&schema, &json!({"role_ids": "r-1"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.as_deref().unwrap().contains("set"));
    }

    #[test]
    fn test_validate_nested_block_single() {
        let schema = Schema::v0().with_block(
            "metastore",
            NestedBlock::single(Block::new().with_attribute("enabled", Attribute::required_bool())),
        );

        assert!(validate(&schema, &json!({"metastore": {"enabled": true}})).is_empty());
        assert!(validate(&schema, &json!({})).is_empty());

        let diagnostics = validate(&schema, &json!({"metastore": {"enabled": "yes"}}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("metastore.enabled".to_string()));
    }

    #[test]
    fn test_validate_nested_block_list() {
        let schema = Schema::v0().with_block(
            "scopes",
            NestedBlock::list(Block::new().with_attribute("entity_id", Attribute::required_string()))
                .with_min_items(1)
                .with_max_items(3),
        );

        assert!(validate(&schema, &json!({"scopes": [{"entity_id": "a"}, {"entity_id": "b"}]}))
            .is_empty());

        let diagnostics = validate(&schema, &json!({"scopes": []}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("at least 1"));

        let diagnostics = validate(
            &schema,
            &json!({"scopes": [
                {"entity_id": "a"}, {"entity_id": "b"}, {"entity_id": "c"}, {"entity_id": "d"}
            ]}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("at most 3"));

        let diagnostics = validate(&schema, &json!({"scopes": [{"entity_id": 7}]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("scopes.0.entity_id".to_string()));
    }

    #[test]
    fn test_validate_computed_block_rejected() {
        let schema = Schema::v0().with_block(
            "members",
            NestedBlock::list(Block::new().with_attribute("user_id", Attribute::computed_string()))
                .computed(),
        );

        assert!(validate(&schema, &json!({})).is_empty());
        assert_eq!(validate(&schema, &json!({"members": []})).len(), 1);
    }

    #[test]
    fn test_validate_multiple_errors() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("count", Attribute::required_int64())
            .with_attribute("enabled", Attribute::required_bool());

        let diagnostics = validate(
            &schema,
            &json!({"name": 123, "count": "not a number", "enabled": "yes"}),
        );
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_is_valid_helper() {
        let schema = Schema::v0().with_attribute("name", Attribute::required_string());

        assert!(is_valid(&schema, &json!({"name": "test"})));
        assert!(!is_valid(&schema, &json!({})));
    }

    #[test]
    fn test_validate_result_helper() {
        let schema = Schema::v0().with_attribute("name", Attribute::required_string());

        assert!(validate_result(&schema, &json!({"name": "test"})).is_ok());

        let result = validate_result(&schema, &json!({}));
        assert_eq!(result.unwrap_err().len(), 1);
    }

    #[test]
    fn test_validate_root_not_object() {
        let schema = Schema::v0().with_attribute("name", Attribute::required_string());

        let diagnostics = validate(&schema, &json!("not an object"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Expected object"));
    }
}
