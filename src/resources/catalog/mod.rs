//! Catalog kinds.
//!
//! Every catalog type lives in its own collection under
//! `/catalogType/{family}/catalog` and shares a handful of attributes.

pub mod bigquery;
pub mod cassandra;
pub mod gcs;
pub mod jdbc;
pub mod mongodb;
pub mod opensearch;
pub mod s3;
pub mod snowflake;

use std::sync::Arc;

use crate::kind::{Identity, KindDefinition, ResourceKind};
use crate::schema::{Attribute, Schema};
use crate::transport::ApiPath;

/// The attributes every catalog carries.
pub fn base_schema(description: &str) -> Schema {
    Schema::v0()
        .with_description(description)
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "catalog_id",
            Attribute::computed_string().with_description("Server-assigned catalog identifier"),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("Catalog name as seen in SQL"),
        )
        .with_attribute("description", Attribute::optional_string())
        .with_attribute(
            "read_only",
            Attribute::optional_bool().with_default(false.into()),
        )
}

/// A catalog definition for `family`, e.g. `s3`.
pub fn definition(kind: &'static str, family: &str, schema: Schema) -> KindDefinition {
    KindDefinition::new(
        kind,
        ApiPath::catalog(family),
        Identity::mirrored("catalogId", "catalog_id"),
        schema,
    )
}

/// Every catalog kind.
pub fn all() -> Vec<Arc<dyn ResourceKind>> {
    vec![
        Arc::new(s3::S3Catalog::new()),
        Arc::new(gcs::GcsCatalog::new()),
        Arc::new(bigquery::bigquery()),
        Arc::new(snowflake::snowflake()),
        Arc::new(jdbc::JdbcCatalog::postgresql()),
        Arc::new(jdbc::JdbcCatalog::mysql()),
        Arc::new(jdbc::JdbcCatalog::redshift()),
        Arc::new(mongodb::MongoCatalog::new()),
        Arc::new(cassandra::cassandra()),
        Arc::new(opensearch::OpenSearchCatalog::new()),
    ]
}

/// The catalog family of a catalog kind name, e.g. `s3` for `catalog.s3`.
pub fn family_of(kind: &str) -> Option<&str> {
    kind.strip_prefix("catalog.")
}
