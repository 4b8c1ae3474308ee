//! Read-only data sources.
//!
//! Most data sources are collection listings: every element the API
//! returns is projected with no prior state, so anything the element does
//! not carry is `Null`, and the elements keep the server's order. The rest
//! read a single status or metadata object.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::kind::{Identity, ResourceKind};
use crate::projector::{project, project_listing, Shape};
use crate::record::Record;
use crate::resources::catalog::family_of;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::transport::Transport;
use crate::value::AttrValue;

/// The attribute a listing stores its elements under.
pub const RESULT: &str = "result";

/// A read-only view of Platform objects.
#[async_trait]
pub trait DataSourceKind: Send + Sync {
    /// The data source name, without the provider prefix.
    fn name(&self) -> &str;

    /// The configuration and result schema.
    fn schema(&self) -> &Schema;

    /// Read the data source for a decoded configuration.
    async fn read(
        &self,
        config: Record,
        transport: &dyn Transport,
        diags: &mut Diagnostics,
    ) -> Result<Record, ProviderError>;
}

// ============================================================================
// Collection listings
// ============================================================================

/// Lists every object of one collection.
pub struct CollectionListing {
    name: String,
    path: String,
    element: Block,
    identity: Option<Identity>,
    kind: Option<Arc<dyn ResourceKind>>,
    schema: Schema,
}

impl CollectionListing {
    /// A listing of a resource kind's collection, named `{kind}_list`.
    ///
    /// Catalogs are listed through the cross-type catalog collection, which
    /// filters on the upper-case family name.
    pub fn of_kind(kind: Arc<dyn ResourceKind>) -> Self {
        let def = kind.definition();
        let path = match family_of(def.kind) {
            Some(family) => format!("/catalog?catalogType={}", family.to_uppercase()),
            None => def.family.collection().to_string(),
        };
        let element = def.schema.block.clone();
        let name = format!("{}_list", def.kind);
        let description = format!("Every {} visible to the configured account", def.kind);
        let mut listing = Self::new(name, path, element, None).with_description(description);
        listing.kind = Some(kind);
        listing
    }

    /// A listing of an arbitrary collection.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        element: Block,
        identity: Option<Identity>,
    ) -> Self {
        let schema = Schema::v0().with_block(
            RESULT,
            NestedBlock::list(element.to_computed()).computed(),
        );
        Self {
            name: name.into(),
            path: path.into(),
            element,
            identity,
            kind: None,
            schema,
        }
    }

    fn with_description(mut self, description: impl Into<String>) -> Self {
        self.schema = self.schema.with_description(description);
        self
    }

    /// The listed path, including any query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn shape(&self) -> Shape<'_> {
        match &self.kind {
            Some(kind) => Shape::of(kind.as_ref()),
            None => Shape {
                block: &self.element,
                identity: self.identity.as_ref(),
                discriminator: None,
            },
        }
    }
}

#[async_trait]
impl DataSourceKind for CollectionListing {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(
        &self,
        mut config: Record,
        transport: &dyn Transport,
        diags: &mut Diagnostics,
    ) -> Result<Record, ProviderError> {
        let elements = transport.list_all(&self.path).await?;
        let items = project_elements(self.shape(), self.kind.as_deref(), &elements, diags)?;
        debug!(data_source = %self.name, count = items.len(), "listed");
        config.set_known(RESULT, AttrValue::List(items));
        Ok(config)
    }
}

fn project_elements(
    shape: Shape<'_>,
    kind: Option<&dyn ResourceKind>,
    elements: &[Value],
    diags: &mut Diagnostics,
) -> Result<Vec<AttrValue>, ProviderError> {
    let mut items = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let Value::Object(object) = element else {
            diags.warning(
                RESULT,
                format!("skipping {RESULT}[{index}]: the API returned a non-object element"),
            );
            continue;
        };
        let mut record = project_listing(shape, object, diags)?;
        if let Some(kind) = kind {
            kind.after_projection(&mut record, object);
        }
        items.push(AttrValue::Object(record));
    }
    Ok(items)
}

// ============================================================================
// Single-object reads
// ============================================================================

fn required_config<'r>(config: &'r Record, name: &str) -> Result<&'r str, ProviderError> {
    config
        .get_str(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ProviderError::Validation(format!("{name} is required")))
}

/// Fold an object into the computed attributes of `config`.
fn fold(
    block: &Block,
    config: &mut Record,
    response: &Map<String, Value>,
    diags: &mut Diagnostics,
) -> Result<(), ProviderError> {
    project(Shape::block(block), config, response, false, diags)?;
    config.resolve_unknowns();
    Ok(())
}

/// The current execution status of a SQL job.
pub struct SqlJobStatus {
    schema: Schema,
}

impl SqlJobStatus {
    /// Describe the data source.
    pub fn new() -> Self {
        let schema = Schema::v0()
            .with_description("The latest execution status of a SQL job")
            .with_attribute("sql_job_id", Attribute::required_string())
            .with_attribute("status", Attribute::computed_string())
            .with_attribute("progress_percentage", Attribute::computed_float64())
            .with_attribute("error_message", Attribute::computed_string())
            .with_attribute("last_execution", Attribute::computed_string())
            .with_attribute("next_execution", Attribute::computed_string());
        Self { schema }
    }
}

impl Default for SqlJobStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSourceKind for SqlJobStatus {
    fn name(&self) -> &str {
        "sql_job_status"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(
        &self,
        mut config: Record,
        transport: &dyn Transport,
        diags: &mut Diagnostics,
    ) -> Result<Record, ProviderError> {
        let id = required_config(&config, "sql_job_id")?.to_string();
        let response = transport.get_object(&format!("/sqlJob/{id}/status")).await?;
        fold(&self.schema.block, &mut config, &response, diags)?;
        Ok(config)
    }
}

/// Past executions of a SQL job, newest first as the server orders them.
pub struct SqlJobHistory {
    element: Block,
    schema: Schema,
}

impl SqlJobHistory {
    /// Describe the data source.
    pub fn new() -> Self {
        let element = Block::new()
            .with_attribute("query_id", Attribute::computed_string())
            .with_attribute("status", Attribute::computed_string())
            .with_attribute("start_time", Attribute::computed_string())
            .with_attribute("end_time", Attribute::computed_string())
            .with_attribute("error_message", Attribute::computed_string());
        let schema = Schema::v0()
            .with_description("Past executions of a SQL job")
            .with_attribute("sql_job_id", Attribute::required_string())
            .with_block(RESULT, NestedBlock::list(element.clone()).computed());
        Self { element, schema }
    }
}

impl Default for SqlJobHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSourceKind for SqlJobHistory {
    fn name(&self) -> &str {
        "sql_job_history"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(
        &self,
        mut config: Record,
        transport: &dyn Transport,
        diags: &mut Diagnostics,
    ) -> Result<Record, ProviderError> {
        let id = required_config(&config, "sql_job_id")?.to_string();
        let elements = transport.list_all(&format!("/sqlJob/{id}/history")).await?;
        let items = project_elements(Shape::block(&self.element), None, &elements, diags)?;
        config.set_known(RESULT, AttrValue::List(items));
        Ok(config)
    }
}

/// What Galaxy needs to assume a role in another AWS account.
pub struct IamRoleMetadata {
    schema: Schema,
}

impl IamRoleMetadata {
    /// Describe the data source.
    pub fn new() -> Self {
        let schema = Schema::v0()
            .with_description("The principal and external id to trust in a cross-account role")
            .with_attribute("aws_iam_arn", Attribute::computed_string())
            .with_attribute("external_id", Attribute::computed_string());
        Self { schema }
    }
}

impl Default for IamRoleMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSourceKind for IamRoleMetadata {
    fn name(&self) -> &str {
        "cross_account_iam_role_metadata"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(
        &self,
        mut config: Record,
        transport: &dyn Transport,
        diags: &mut Diagnostics,
    ) -> Result<Record, ProviderError> {
        let response = transport.get_object("/crossAccountIamRoleMetadata").await?;
        fold(&self.schema.block, &mut config, &response, diags)?;
        Ok(config)
    }
}

/// Runs the server-side connectivity check of a catalog.
pub struct CatalogValidation {
    families: Vec<String>,
    schema: Schema,
}

impl CatalogValidation {
    /// Describe the data source for the given catalog families.
    pub fn new(families: Vec<String>) -> Self {
        let schema = Schema::v0()
            .with_description("Validates that Galaxy can reach a catalog's data source")
            .with_attribute("catalog_id", Attribute::required_string())
            .with_attribute(
                "catalog_type",
                Attribute::required_string()
                    .with_description(format!("One of {}", families.join(", "))),
            )
            .with_attribute("validation_successful", Attribute::computed_bool())
            .with_attribute("error_messages", Attribute::computed_string_list())
            .with_attribute("warning_messages", Attribute::computed_string_list())
            .with_attribute("info_messages", Attribute::computed_string_list());
        Self { families, schema }
    }
}

#[async_trait]
impl DataSourceKind for CatalogValidation {
    fn name(&self) -> &str {
        "catalog_validation"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(
        &self,
        mut config: Record,
        transport: &dyn Transport,
        diags: &mut Diagnostics,
    ) -> Result<Record, ProviderError> {
        let id = required_config(&config, "catalog_id")?.to_string();
        let family = required_config(&config, "catalog_type")?.to_string();
        if !self.families.contains(&family) {
            return Err(ProviderError::Validation(format!(
                "invalid catalog_type '{}': expected one of {}",
                family,
                self.families.join(", ")
            )));
        }

        let path = format!("/catalogType/{family}/catalog/{id}/validate");
        let response = transport.post_action(&path, Map::new()).await?;
        fold(&self.schema.block, &mut config, &response, diags)?;
        if config.get_bool("validation_successful") == Some(false) {
            debug!(catalog_id = %id, "catalog validation reported failures");
        }
        Ok(config)
    }
}

/// Every data source for the given resource kinds.
pub fn all(kinds: &[Arc<dyn ResourceKind>]) -> Vec<Arc<dyn DataSourceKind>> {
    let mut sources: Vec<Arc<dyn DataSourceKind>> = kinds
        .iter()
        .filter(|kind| kind.definition().importable)
        .map(|kind| Arc::new(CollectionListing::of_kind(Arc::clone(kind))) as Arc<dyn DataSourceKind>)
        .collect();

    let privatelink = Block::new()
        .with_attribute("privatelink_id", Attribute::computed_string())
        .with_attribute("name", Attribute::computed_string())
        .with_attribute("cloud_region_id", Attribute::computed_string());
    sources.push(Arc::new(CollectionListing::new(
        "privatelink_list",
        "/privatelink",
        privatelink,
        None,
    )));

    let families = kinds
        .iter()
        .filter_map(|kind| family_of(kind.definition().kind))
        .map(str::to_string)
        .collect();
    sources.push(Arc::new(SqlJobStatus::new()));
    sources.push(Arc::new(SqlJobHistory::new()));
    sources.push(Arc::new(IamRoleMetadata::new()));
    sources.push(Arc::new(CatalogValidation::new(families)));
    sources
}
