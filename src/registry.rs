//! Resource and data source lookup by host type name.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::datasources::{self, DataSourceKind};
use crate::error::ProviderError;
use crate::kind::{type_name, ResourceKind};
use crate::resources;
use crate::schema::ProviderSchema;

/// The type-name prefix of every Galaxy resource and data source.
pub const DEFAULT_PREFIX: &str = "galaxy";

/// Maps host type names such as `galaxy_catalog_s3` to their kinds.
#[derive(Clone)]
pub struct Registry {
    prefix: String,
    resources: BTreeMap<String, Arc<dyn ResourceKind>>,
    data_sources: BTreeMap<String, Arc<dyn DataSourceKind>>,
}

impl Registry {
    /// An empty registry whose type names start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        }
    }

    /// Every Galaxy resource kind and data source.
    pub fn galaxy() -> Self {
        let kinds = resources::all();
        let sources = datasources::all(&kinds);
        let registry = kinds
            .into_iter()
            .fold(Self::new(DEFAULT_PREFIX), Self::with_resource);
        sources.into_iter().fold(registry, Self::with_data_source)
    }

    /// Register a resource kind.
    pub fn with_resource(mut self, kind: Arc<dyn ResourceKind>) -> Self {
        let name = kind.definition().type_name(&self.prefix);
        self.resources.insert(name, kind);
        self
    }

    /// Register a data source.
    pub fn with_data_source(mut self, source: Arc<dyn DataSourceKind>) -> Self {
        let name = type_name(&self.prefix, source.name());
        self.data_sources.insert(name, source);
        self
    }

    /// The type-name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Look up a resource kind.
    pub fn resource(&self, resource_type: &str) -> Result<&dyn ResourceKind, ProviderError> {
        self.resources
            .get(resource_type)
            .map(|kind| kind.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    /// Look up a data source.
    pub fn data_source(&self, data_source_type: &str) -> Result<&dyn DataSourceKind, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .map(|source| source.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }

    /// The full provider schema.
    pub fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = self.resources.iter().fold(schema, |schema, (name, kind)| {
            schema.with_resource(name.clone(), kind.definition().schema.clone())
        });
        self.data_sources.iter().fold(schema, |schema, (name, source)| {
            schema.with_data_source(name.clone(), source.schema().clone())
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::galaxy()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("prefix", &self.prefix)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_galaxy_type_names() {
        let registry = Registry::galaxy();
        assert!(registry.resource("galaxy_catalog_s3").is_ok());
        assert!(registry.resource("galaxy_role_privilege_grant").is_ok());
        assert!(registry.data_source("galaxy_cluster_list").is_ok());
        assert!(registry.data_source("galaxy_catalog_s3_list").is_ok());
        assert!(registry.data_source("galaxy_sql_job_status").is_ok());
    }

    #[test]
    fn test_unknown_type() {
        let registry = Registry::galaxy();
        let err = registry.resource("galaxy_warehouse").err().unwrap();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
        assert!(registry.data_source("galaxy_cluster").is_err());
    }

    #[test]
    fn test_schema_covers_registry() {
        let registry = Registry::galaxy();
        let schema = registry.schema();
        assert_eq!(schema.resources.len(), 21);
        assert!(schema.provider.block.contains("client_secret"));
        assert!(schema.data_sources.contains_key("galaxy_catalog_validation"));
    }

    #[test]
    fn test_custom_prefix() {
        let registry = Registry::new("acme").with_resource(Arc::new(resources::governance::tag()));
        assert_eq!(registry.prefix(), "acme");
        assert!(registry.resource("acme_tag").is_ok());
    }
}
