//! MongoDB catalogs.

use crate::diagnostics::Diagnostics;
use crate::discriminator::{Discriminator, Variant};
use crate::kind::{KindDefinition, ResourceKind};
use crate::record::Record;
use crate::resources::require_when;
use crate::schema::Attribute;

/// How a MongoDB catalog finds its cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    /// An explicit host list.
    Direct,
    /// A `mongodb+srv` DNS seed list.
    DnsSeedList,
}

impl Variant for Connection {
    const ATTRIBUTE: &'static str = "connection_type";

    fn all() -> &'static [Self] {
        &[Connection::Direct, Connection::DnsSeedList]
    }

    fn name(&self) -> &'static str {
        match self {
            Connection::Direct => "direct",
            Connection::DnsSeedList => "dnsSeedList",
        }
    }

    fn fields(&self) -> &'static [&'static str] {
        match self {
            Connection::Direct => &["hosts", "replica_set"],
            Connection::DnsSeedList => &["dns_seed_list_host"],
        }
    }
}

/// The `catalog.mongodb` kind.
#[derive(Debug, Clone)]
pub struct MongoCatalog(KindDefinition);

impl MongoCatalog {
    /// Describe the kind.
    pub fn new() -> Self {
        let schema = super::base_schema("A catalog exposing a MongoDB cluster")
            .with_attribute(
                "connection_type",
                Attribute::required_string().with_description("direct or dnsSeedList"),
            )
            .with_attribute(
                "hosts",
                Attribute::optional_string_list().with_description("host:port pairs"),
            )
            .with_attribute("replica_set", Attribute::optional_string().empty_as_null())
            .with_attribute("dns_seed_list_host", Attribute::optional_string())
            .with_attribute("username", Attribute::required_string())
            .with_attribute("password", Attribute::required_secret())
            .with_attribute(
                "tls_enabled",
                Attribute::optional_bool().with_default(true.into()),
            )
            .with_attribute("ssh_tunnel_id", Attribute::optional_string().empty_as_null())
            .with_attribute("private_link_id", Attribute::optional_string().empty_as_null());

        Self(
            super::definition("catalog.mongodb", "mongodb", schema)
                .with_discriminator(Discriminator::of::<Connection>()),
        )
    }
}

impl Default for MongoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceKind for MongoCatalog {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        match plan.get_str("connection_type").and_then(Connection::parse) {
            Some(Connection::Direct) => {
                require_when(plan, diags, "hosts", "connection_type is direct")
            },
            Some(Connection::DnsSeedList) => {
                require_when(plan, diags, "dns_seed_list_host", "connection_type is dnsSeedList")
            },
            None => {},
        }
    }
}
