//! The Galaxy resource catalogue.
//!
//! Each submodule describes one family of Platform objects as a
//! [`ResourceKind`]. Kinds without business rules of their own use
//! [`BasicKind`].

pub mod access;
pub mod catalog;
pub mod cluster;
pub mod data_product;
pub mod governance;
pub mod iam;
pub mod service_account;
pub mod sql_job;

use std::sync::Arc;

use crate::diagnostics::Diagnostics;
use crate::kind::{KindDefinition, ResourceKind};
use crate::record::Record;

/// A kind with no rules beyond its definition.
#[derive(Debug, Clone)]
pub struct BasicKind(KindDefinition);

impl BasicKind {
    /// Wrap a definition.
    pub fn new(definition: KindDefinition) -> Self {
        Self(definition)
    }
}

impl ResourceKind for BasicKind {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }
}

/// Every resource kind the provider serves.
pub fn all() -> Vec<Arc<dyn ResourceKind>> {
    let mut kinds = catalog::all();
    kinds.extend([
        Arc::new(cluster::Cluster::new()) as Arc<dyn ResourceKind>,
        Arc::new(access::role()),
        Arc::new(access::role_privilege_grant()),
        Arc::new(access::Policy::new()),
        Arc::new(governance::column_mask()),
        Arc::new(governance::row_filter()),
        Arc::new(governance::tag()),
        Arc::new(data_product::DataProduct::new()),
        Arc::new(service_account::service_account()),
        Arc::new(sql_job::sql_job()),
        Arc::new(iam::cross_account_iam_role()),
    ]);
    kinds
}

/// Record an error unless `name` holds a value or is still unknown.
pub(crate) fn require_when(record: &Record, diags: &mut Diagnostics, name: &str, condition: &str) {
    if record.get(name).is_null() {
        diags.error(name, format!("{name} is required when {condition}"));
    }
}
