//! Data governance objects: column masks, row filters and tags.

use crate::kind::{Identity, KindDefinition};
use crate::resources::BasicKind;
use crate::schema::{Attribute, Schema};
use crate::transport::ApiPath;

fn governed(
    kind: &'static str,
    path: &str,
    identity: Identity,
    schema: Schema,
) -> BasicKind {
    BasicKind::new(KindDefinition::new(kind, ApiPath::new(path), identity, schema))
}

/// The `column_mask` kind.
pub fn column_mask() -> BasicKind {
    let schema = Schema::v0()
        .with_description("A SQL expression that masks a column's values")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("column_mask_id", Attribute::computed_string())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("description", Attribute::optional_string())
        .with_attribute(
            "expression",
            Attribute::required_string().with_description("Refers to the column as `@column`"),
        )
        .with_attribute(
            "column_mask_type",
            Attribute::required_string().with_description("Varchar, Integer, Date, ..."),
        )
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("modified", Attribute::computed_string());
    governed(
        "column_mask",
        "/columnMask",
        Identity::mirrored("columnMaskId", "column_mask_id"),
        schema,
    )
}

/// The `row_filter` kind.
pub fn row_filter() -> BasicKind {
    let schema = Schema::v0()
        .with_description("A SQL predicate that filters the rows of a table")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("row_filter_id", Attribute::computed_string())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("description", Attribute::optional_string())
        .with_attribute("expression", Attribute::required_string())
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("modified", Attribute::computed_string());
    governed(
        "row_filter",
        "/rowFilter",
        Identity::mirrored("rowFilterId", "row_filter_id"),
        schema,
    )
}

/// The `tag` kind.
pub fn tag() -> BasicKind {
    let schema = Schema::v0()
        .with_description("A label attachable to catalogs, schemas, tables and columns")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("tag_id", Attribute::computed_string())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("description", Attribute::optional_string())
        .with_attribute(
            "color",
            Attribute::optional_computed_string().with_description("Hex color, e.g. #1976D2"),
        );
    governed("tag", "/tag", Identity::mirrored("tagId", "tag_id"), schema)
}
