//! Data products.

use serde_json::{Map, Value};

use crate::kind::{Identity, KindDefinition, Operation, ResourceKind};
use crate::record::Record;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::transport::ApiPath;

/// The `data_product` kind.
#[derive(Debug, Clone)]
pub struct DataProduct(KindDefinition);

impl DataProduct {
    /// Describe the kind.
    pub fn new() -> Self {
        let contact = Block::new()
            .with_attribute("user_id", Attribute::optional_computed_string())
            .with_attribute("email", Attribute::required_string());
        let link = Block::new()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("uri", Attribute::required_string());

        let schema = Schema::v0()
            .with_description("A curated schema published with ownership metadata")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("data_product_id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("summary", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("catalog_id", Attribute::required_string().with_force_new())
            .with_attribute("schema_name", Attribute::required_string().with_force_new())
            .with_attribute("default_cluster_id", Attribute::optional_string())
            .with_block("contacts", NestedBlock::list(contact))
            .with_block("links", NestedBlock::list(link))
            .with_attribute("created_on", Attribute::computed_string())
            .with_attribute("modified_on", Attribute::computed_string());

        Self(KindDefinition::new(
            "data_product",
            ApiPath::new("/dataProduct"),
            Identity::mirrored("dataProductId", "data_product_id"),
            schema,
        ))
    }
}

impl Default for DataProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceKind for DataProduct {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    /// The create endpoint insists on a `contacts` array.
    fn customize_request(&self, _plan: &Record, body: &mut Map<String, Value>, op: Operation) {
        if op == Operation::Create {
            body.entry("contacts").or_insert_with(|| Value::Array(Vec::new()));
        }
    }
}
