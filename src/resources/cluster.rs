//! Galaxy clusters.

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;
use crate::kind::{Identity, KindDefinition, ResourceKind};
use crate::plan::{force_bool, gate_on_flag};
use crate::record::Record;
use crate::schema::{Attribute, Schema};
use crate::transport::ApiPath;

/// Processing modes containing this marker run on the WarpSpeed engine.
pub const WARP_SPEED_MARKER: &str = "WarpSpeed";

/// The only cluster state in which the Trino URI is reachable.
pub const ENABLED_STATE: &str = "ENABLED";

/// The `cluster` kind.
#[derive(Debug, Clone)]
pub struct Cluster(KindDefinition);

impl Cluster {
    /// Describe the kind.
    pub fn new() -> Self {
        let schema = Schema::v0()
            .with_description("A Trino cluster")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("cluster_id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "cloud_region_id",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("e.g. aws-us-east1"),
            )
            .with_attribute("min_workers", Attribute::required_int64())
            .with_attribute("max_workers", Attribute::required_int64())
            .with_attribute(
                "idle_stop_minutes",
                Attribute::optional_computed_int64()
                    .with_description("Minutes of inactivity before suspension; -1 disables"),
            )
            .with_attribute(
                "catalog_refs",
                Attribute::optional_string_set().with_description("Ids of attached catalogs"),
            )
            .with_attribute("processing_mode", Attribute::optional_computed_string())
            .with_attribute(
                "private_link_cluster",
                Attribute::optional_bool().with_force_new(),
            )
            .with_attribute("result_cache_enabled", Attribute::optional_computed_bool())
            .with_attribute(
                "result_cache_default_visibility_seconds",
                Attribute::optional_computed_int64().not_echoed(),
            )
            .with_attribute("warp_resiliency_enabled", Attribute::optional_computed_bool())
            .with_attribute("cluster_state", Attribute::computed_string())
            .with_attribute("trino_uri", Attribute::computed_string());

        Self(KindDefinition::new(
            "cluster",
            ApiPath::new("/cluster"),
            Identity::mirrored("clusterId", "cluster_id"),
            schema,
        ))
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceKind for Cluster {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        if let (Some(min), Some(max)) = (plan.get_i64("min_workers"), plan.get_i64("max_workers")) {
            if min > max {
                diags.error(
                    "min_workers",
                    format!("min_workers ({min}) must not exceed max_workers ({max})"),
                );
            }
        }
    }

    fn modify_plan(&self, plan: &mut Record, diags: &mut Diagnostics) {
        let warp_speed = plan
            .get_str("processing_mode")
            .is_some_and(|mode| mode.contains(WARP_SPEED_MARKER));
        if warp_speed {
            force_bool(
                plan,
                "warp_resiliency_enabled",
                true,
                "WarpSpeed processing modes always run with resiliency",
                diags,
            );
        }
        gate_on_flag(
            plan,
            "result_cache_enabled",
            "result_cache_default_visibility_seconds",
        );
    }

    fn after_projection(&self, record: &mut Record, _response: &Map<String, Value>) {
        if record.get_str("cluster_state") != Some(ENABLED_STATE) {
            record.set_null("trino_uri");
        }
    }
}
