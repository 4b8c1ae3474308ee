//! Apache Cassandra catalogs.

use crate::resources::BasicKind;
use crate::schema::Attribute;

/// The `catalog.cassandra` kind.
pub fn cassandra() -> BasicKind {
    let schema = super::base_schema("A catalog exposing a Cassandra keyspace set")
        .with_attribute(
            "contact_points",
            Attribute::required_string_list().with_description("Seed node hostnames"),
        )
        .with_attribute(
            "port",
            Attribute::optional_int64().with_default(9042.into()),
        )
        .with_attribute("local_datacenter", Attribute::required_string())
        .with_attribute("username", Attribute::required_string())
        .with_attribute("password", Attribute::required_secret())
        .with_attribute("ssh_tunnel_id", Attribute::optional_string().empty_as_null());
    BasicKind::new(super::definition("catalog.cassandra", "cassandra", schema))
}
