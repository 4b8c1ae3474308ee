//! OpenSearch catalogs.

use crate::diagnostics::Diagnostics;
use crate::discriminator::{Discriminator, Variant};
use crate::kind::{KindDefinition, ResourceKind};
use crate::record::Record;
use crate::resources::require_when;
use crate::schema::Attribute;

/// How a search catalog authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// HTTP basic authentication.
    Basic,
    /// Static AWS IAM keys.
    AwsIam,
    /// An assumed AWS role.
    RoleBased,
}

impl Auth {
    fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Auth::Basic => &["username", "password"],
            Auth::AwsIam => &["access_key", "secret_key", "region"],
            Auth::RoleBased => &["role_arn", "region"],
        }
    }
}

impl Variant for Auth {
    const ATTRIBUTE: &'static str = "auth_type";

    fn all() -> &'static [Self] {
        &[Auth::Basic, Auth::AwsIam, Auth::RoleBased]
    }

    fn name(&self) -> &'static str {
        match self {
            Auth::Basic => "basic",
            Auth::AwsIam => "awsIam",
            Auth::RoleBased => "roleBased",
        }
    }

    fn fields(&self) -> &'static [&'static str] {
        match self {
            Auth::Basic => &["username", "password"],
            Auth::AwsIam => &["access_key", "secret_key", "region"],
            Auth::RoleBased => &["role_arn", "external_id", "region"],
        }
    }
}

/// The `catalog.opensearch` kind.
#[derive(Debug, Clone)]
pub struct OpenSearchCatalog(KindDefinition);

impl OpenSearchCatalog {
    /// Describe the kind.
    pub fn new() -> Self {
        let schema = super::base_schema("A catalog exposing OpenSearch indexes")
            .with_attribute("auth_type", Attribute::required_string())
            .with_attribute("endpoint", Attribute::required_string())
            .with_attribute(
                "port",
                Attribute::optional_int64().with_default(443.into()),
            )
            .with_attribute("username", Attribute::optional_string())
            .with_attribute("password", Attribute::optional_secret())
            .with_attribute("access_key", Attribute::optional_string().empty_as_null())
            .with_attribute("secret_key", Attribute::optional_secret())
            .with_attribute("role_arn", Attribute::optional_string().empty_as_null())
            .with_attribute("external_id", Attribute::optional_computed_string().empty_as_null())
            .with_attribute("region", Attribute::optional_string().empty_as_null());

        Self(
            super::definition("catalog.opensearch", "opensearch", schema)
                .with_discriminator(Discriminator::of::<Auth>()),
        )
    }
}

impl Default for OpenSearchCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceKind for OpenSearchCatalog {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        let Some(auth) = plan.get_str("auth_type").and_then(Auth::parse) else {
            return;
        };
        let condition = format!("auth_type is {}", auth.name());
        for field in auth.required_fields() {
            require_when(plan, diags, field, &condition);
        }
    }
}
