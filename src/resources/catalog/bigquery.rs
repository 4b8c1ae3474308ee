//! Google BigQuery catalogs.

use crate::resources::BasicKind;
use crate::schema::Attribute;

/// The `catalog.bigquery` kind.
pub fn bigquery() -> BasicKind {
    let schema = super::base_schema("A catalog exposing Google BigQuery datasets")
        .with_attribute(
            "credentials_key",
            Attribute::required_secret()
                .with_description("Service account key JSON; never read back"),
        )
        .with_attribute(
            "parent_project_id",
            Attribute::optional_computed_string().empty_as_null(),
        );
    BasicKind::new(super::definition("catalog.bigquery", "bigquery", schema))
}
