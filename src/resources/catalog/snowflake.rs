//! Snowflake catalogs.
//!
//! The create endpoint rejects `role`, `warehouse` and `cloudKind` with an
//! "Unrecognized entity" error, so those fields are applied by an update
//! right after creation.

use crate::resources::BasicKind;
use crate::schema::Attribute;

/// The `catalog.snowflake` kind.
pub fn snowflake() -> BasicKind {
    let schema = super::base_schema("A catalog exposing a Snowflake database")
        .with_attribute(
            "account_identifier",
            Attribute::required_string().with_description("e.g. xy12345.us-east-2.aws"),
        )
        .with_attribute("database_name", Attribute::required_string())
        .with_attribute("username", Attribute::required_string())
        .with_attribute("password", Attribute::required_secret())
        .with_attribute("role", Attribute::optional_string().omit_on_create())
        .with_attribute("warehouse", Attribute::optional_string().omit_on_create())
        .with_attribute("cloud_kind", Attribute::optional_string().omit_on_create());
    BasicKind::new(super::definition("catalog.snowflake", "snowflake", schema))
}
