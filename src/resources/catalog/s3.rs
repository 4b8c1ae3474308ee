//! Amazon S3 object-store catalogs.

use crate::diagnostics::Diagnostics;
use crate::discriminator::{Discriminator, Variant};
use crate::kind::{KindDefinition, ResourceKind};
use crate::plan::MutualExclusion;
use crate::record::Record;
use crate::resources::require_when;
use crate::schema::Attribute;

/// Where an object-store catalog keeps its table metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metastore {
    /// The Galaxy-managed metastore.
    Galaxy,
    /// AWS Glue.
    Glue,
    /// A customer-run Hive metastore.
    Hive,
}

impl Variant for Metastore {
    const ATTRIBUTE: &'static str = "metastore_type";

    fn all() -> &'static [Self] {
        &[Metastore::Galaxy, Metastore::Glue, Metastore::Hive]
    }

    fn name(&self) -> &'static str {
        match self {
            Metastore::Galaxy => "galaxy",
            Metastore::Glue => "glue",
            Metastore::Hive => "hive",
        }
    }

    fn fields(&self) -> &'static [&'static str] {
        match self {
            Metastore::Galaxy => &["default_bucket", "default_data_location"],
            Metastore::Glue => &["default_bucket", "default_data_location", "region"],
            Metastore::Hive => &["hive_metastore_host", "hive_metastore_port", "ssh_tunnel_id"],
        }
    }
}

/// Role-based credentials win over static access keys.
pub const ROLE_OVER_KEYS: MutualExclusion =
    MutualExclusion::new(&["role_arn"], &["access_key", "secret_key"]);

/// The `catalog.s3` kind.
#[derive(Debug, Clone)]
pub struct S3Catalog(KindDefinition);

impl S3Catalog {
    /// Describe the kind.
    pub fn new() -> Self {
        let schema = super::base_schema("An object-store catalog backed by Amazon S3")
            .with_attribute(
                "metastore_type",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("One of galaxy, glue or hive"),
            )
            .with_attribute(
                "role_arn",
                Attribute::optional_string()
                    .empty_as_null()
                    .with_description("IAM role assumed to reach the bucket"),
            )
            .with_attribute(
                "external_id",
                Attribute::optional_computed_string().empty_as_null(),
            )
            .with_attribute("access_key", Attribute::optional_string().empty_as_null())
            .with_attribute("secret_key", Attribute::optional_secret())
            .with_attribute("default_bucket", Attribute::optional_string())
            .with_attribute("default_data_location", Attribute::optional_string())
            .with_attribute("region", Attribute::optional_computed_string().empty_as_null())
            .with_attribute(
                "hive_metastore_host",
                Attribute::optional_string().empty_as_null(),
            )
            .with_attribute("hive_metastore_port", Attribute::optional_int64())
            .with_attribute("ssh_tunnel_id", Attribute::optional_string().empty_as_null());

        Self(
            super::definition("catalog.s3", "s3", schema)
                .with_discriminator(Discriminator::of::<Metastore>())
                .with_exclusion(ROLE_OVER_KEYS),
        )
    }
}

impl Default for S3Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceKind for S3Catalog {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        if plan.is_set("access_key") && !ROLE_OVER_KEYS.dominant_present(plan) {
            require_when(plan, diags, "secret_key", "access_key is set");
        }
        if plan.get_str("metastore_type") == Some(Metastore::Hive.name()) {
            require_when(plan, diags, "hive_metastore_host", "metastore_type is hive");
        }
    }
}
