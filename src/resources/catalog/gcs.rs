//! Google Cloud Storage object-store catalogs.

use crate::diagnostics::Diagnostics;
use crate::discriminator::{Discriminator, Variant};
use crate::kind::{KindDefinition, ResourceKind};
use crate::record::Record;
use crate::resources::require_when;
use crate::schema::Attribute;

/// Metastore choices for GCS catalogs. Glue is not offered on GCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcsMetastore {
    /// The Galaxy-managed metastore.
    Galaxy,
    /// A customer-run Hive metastore.
    Hive,
}

impl Variant for GcsMetastore {
    const ATTRIBUTE: &'static str = "metastore_type";

    fn all() -> &'static [Self] {
        &[GcsMetastore::Galaxy, GcsMetastore::Hive]
    }

    fn name(&self) -> &'static str {
        match self {
            GcsMetastore::Galaxy => "galaxy",
            GcsMetastore::Hive => "hive",
        }
    }

    fn fields(&self) -> &'static [&'static str] {
        match self {
            GcsMetastore::Galaxy => &["default_bucket", "default_data_location"],
            GcsMetastore::Hive => &["hive_metastore_host", "hive_metastore_port", "ssh_tunnel_id"],
        }
    }
}

/// The `catalog.gcs` kind.
#[derive(Debug, Clone)]
pub struct GcsCatalog(KindDefinition);

impl GcsCatalog {
    /// Describe the kind.
    pub fn new() -> Self {
        let schema = super::base_schema("An object-store catalog backed by Google Cloud Storage")
            .with_attribute(
                "metastore_type",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute(
                "credentials_key",
                Attribute::required_secret()
                    .with_description("Service account key JSON; never read back"),
            )
            .with_attribute("default_bucket", Attribute::optional_string())
            .with_attribute("default_data_location", Attribute::optional_string())
            .with_attribute(
                "hive_metastore_host",
                Attribute::optional_string().empty_as_null(),
            )
            .with_attribute("hive_metastore_port", Attribute::optional_int64())
            .with_attribute("ssh_tunnel_id", Attribute::optional_string().empty_as_null());

        Self(
            super::definition("catalog.gcs", "gcs", schema)
                .with_discriminator(Discriminator::of::<GcsMetastore>()),
        )
    }
}

impl Default for GcsCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceKind for GcsCatalog {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        if plan.get_str("metastore_type") == Some(GcsMetastore::Hive.name()) {
            require_when(plan, diags, "hive_metastore_host", "metastore_type is hive");
            require_when(plan, diags, "hive_metastore_port", "metastore_type is hive");
        }
    }
}
