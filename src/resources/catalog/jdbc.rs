//! Relational catalogs reached over JDBC: PostgreSQL, MySQL and Redshift.
//!
//! All three share one attribute layout. A catalog is reached either
//! directly, through an SSH tunnel, or through a private link; the two
//! indirect routes cannot be combined.

use crate::diagnostics::Diagnostics;
use crate::kind::{KindDefinition, ResourceKind};
use crate::record::Record;
use crate::schema::{Attribute, Schema};

/// A JDBC catalog kind.
#[derive(Debug, Clone)]
pub struct JdbcCatalog(KindDefinition);

impl JdbcCatalog {
    /// The `catalog.postgresql` kind.
    pub fn postgresql() -> Self {
        let schema = connection_schema("A catalog exposing a PostgreSQL database", 5432)
            .with_attribute("database_name", Attribute::required_string());
        Self(super::definition("catalog.postgresql", "postgresql", schema))
    }

    /// The `catalog.mysql` kind.
    pub fn mysql() -> Self {
        let schema = connection_schema("A catalog exposing a MySQL server", 3306);
        Self(super::definition("catalog.mysql", "mysql", schema))
    }

    /// The `catalog.redshift` kind.
    pub fn redshift() -> Self {
        let schema = connection_schema("A catalog exposing an Amazon Redshift database", 5439)
            .with_attribute("database_name", Attribute::required_string());
        Self(super::definition("catalog.redshift", "redshift", schema))
    }
}

fn connection_schema(description: &str, default_port: i64) -> Schema {
    super::base_schema(description)
        .with_attribute(
            "endpoint",
            Attribute::required_string().with_description("Hostname of the database server"),
        )
        .with_attribute(
            "port",
            Attribute::optional_int64().with_default(default_port.into()),
        )
        .with_attribute("username", Attribute::required_string())
        .with_attribute("password", Attribute::required_secret())
        .with_attribute(
            "ssh_tunnel_id",
            Attribute::optional_string().empty_as_null(),
        )
        .with_attribute(
            "private_link_id",
            Attribute::optional_string().empty_as_null(),
        )
}

impl ResourceKind for JdbcCatalog {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        if plan.is_set("ssh_tunnel_id") && plan.is_set("private_link_id") {
            diags.error(
                "private_link_id",
                "ssh_tunnel_id and private_link_id cannot both be set",
            );
        }
    }
}
