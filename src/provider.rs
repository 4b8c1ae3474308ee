//! The Galaxy provider.
//!
//! [`GalaxyProvider`] implements [`ProviderService`] on top of the
//! reconciliation engine: it decodes host JSON into records, plans with the
//! kind's rules, and hands apply operations to a [`ResourceController`].

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::controller::{cancellable, ReadOutcome, ResourceController};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ProviderError;
use crate::kind::ResourceKind;
use crate::plan::{keep_set_order, modify_plan, null_unechoed};
use crate::record::Record;
use crate::registry::Registry;
use crate::schema::{Block, Flavor, ProviderSchema};
use crate::service::ProviderService;
use crate::transport::{HttpTransport, Transport};
use crate::types::{AttributeChange, ImportedResource, OperationResult, PlanResult};
use crate::validation;
use crate::value::{attr_to_host_json, Attr};

/// A provider for the Galaxy Platform API.
pub struct GalaxyProvider {
    registry: Registry,
    transport: RwLock<Option<Arc<dyn Transport>>>,
    cancel: CancellationToken,
}

impl GalaxyProvider {
    /// A provider serving every Galaxy resource and data source.
    pub fn new() -> Self {
        Self::with_registry(Registry::galaxy())
    }

    /// A provider serving the kinds in `registry`.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            transport: RwLock::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// Use `transport` instead of building one at configure time.
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        Self {
            transport: RwLock::new(Some(Arc::new(transport))),
            ..self
        }
    }

    /// The registered kinds.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    async fn transport(&self) -> Result<Arc<dyn Transport>, ProviderError> {
        self.transport.read().await.clone().ok_or_else(|| {
            ProviderError::FailedPrecondition(
                "the provider must be configured before it can reach the API".into(),
            )
        })
    }

    async fn configure_transport(&self, config: &ProviderConfig) -> Result<(), ProviderError> {
        let transport = HttpTransport::new(config)?;
        *self.transport.write().await = Some(Arc::new(transport));
        Ok(())
    }

    fn controller<'a>(
        &self,
        kind: &'a dyn ResourceKind,
        transport: &'a dyn Transport,
    ) -> ResourceController<'a> {
        ResourceController::new(kind, transport, self.cancel.child_token())
    }
}

impl Default for GalaxyProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(kind: &dyn ResourceKind, value: &Value) -> Result<Record, ProviderError> {
    Record::from_host_json(&kind.definition().schema.block, value)
}

/// Fill in what the plan cannot know from configuration alone.
///
/// Without `prior` (a create or a replacement) computed attributes become
/// `Unknown`; otherwise they carry the stored value. Optional-computed
/// attributes the configuration leaves unset are treated the same way.
fn seed_computed(block: &Block, prior: Option<&Record>, planned: &mut Record) {
    let seed = |name: &str, planned: &mut Record| {
        let next = match prior {
            Some(prior) => prior.get(name).clone(),
            None => Attr::Unknown,
        };
        planned.set(name, next);
    };

    for (name, attr) in &block.attributes {
        match attr.flavor() {
            Flavor::Computed if prior.is_some() || !planned.is_known(name) => seed(name, planned),
            Flavor::OptionalComputed if planned.get(name).is_null() => seed(name, planned),
            _ => {},
        }
    }
    for (name, nested) in &block.blocks {
        let optional_computed = nested.flags.optional && nested.flags.computed;
        if nested.flags.is_computed_only() || (optional_computed && planned.get(name).is_null()) {
            seed(name, planned);
        }
    }
}

/// Whether moving from `prior` to `planned` changes a replacement-forcing attribute.
fn forces_replacement(block: &Block, prior: &Record, planned: &Record) -> bool {
    block.attributes.iter().any(|(name, attr)| {
        attr.force_new && !planned.get(name).is_unknown() && prior.get(name) != planned.get(name)
    })
}

/// The top-level attribute changes between `prior` and `planned`.
fn diff(block: &Block, prior: Option<&Record>, planned: &Record) -> Vec<AttributeChange> {
    let names = block.attributes.keys().chain(block.blocks.keys());
    names
        .filter_map(|name| {
            let after = planned.get(name);
            let Some(prior) = prior else {
                return (!after.is_null())
                    .then(|| AttributeChange::added(name.clone(), attr_to_host_json(after)));
            };
            let before = prior.get(name);
            if before == after {
                return None;
            }
            Some(match (before, after) {
                (Attr::Null, after) => AttributeChange::added(name.clone(), attr_to_host_json(after)),
                (before, Attr::Null) => {
                    AttributeChange::removed(name.clone(), attr_to_host_json(before))
                },
                (before, after) => AttributeChange::modified(
                    name.clone(),
                    attr_to_host_json(before),
                    attr_to_host_json(after),
                ),
            })
        })
        .collect()
}

/// Copy the identifier into whichever of the identity attribute and its
/// mirror is missing.
fn backfill_identity(kind: &dyn ResourceKind, state: Value) -> Value {
    let identity = &kind.definition().identity;
    let (Value::Object(mut map), Some(mirror)) = (state.clone(), identity.mirror) else {
        return state;
    };
    let present = |map: &serde_json::Map<String, Value>, key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    match (present(&map, identity.attribute), present(&map, mirror)) {
        (Some(id), None) => {
            map.insert(mirror.to_string(), Value::String(id));
        },
        (None, Some(id)) => {
            map.insert(identity.attribute.to_string(), Value::String(id));
        },
        _ => {},
    }
    Value::Object(map)
}

#[async_trait::async_trait]
impl ProviderService for GalaxyProvider {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    fn schema(&self) -> ProviderSchema {
        self.registry.schema()
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    #[instrument(skip(self, config), name = "validate_provider_config")]
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("ValidateProviderConfig called");
        let diagnostics = ProviderConfig::validate(&config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            warn!(diagnostics = diagnostics.len(), "ValidateProviderConfig completed with errors");
        }
        Ok(diagnostics)
    }

    #[instrument(skip(self, config), name = "configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("Configure called");
        let result = async {
            let config = ProviderConfig::from_value(&config)?;
            self.configure_transport(&config).await?;
            Ok::<_, ProviderError>(config)
        }
        .await;
        match result {
            Ok(config) => {
                info!(domain = %config.domain, "Configure completed successfully");
                Ok(Vec::new())
            },
            Err(e) => {
                error!(error = %e, "Configure failed");
                Err(ProviderError::Configuration(e.message().to_string()))
            },
        }
    }

    #[instrument(skip(self), name = "stop")]
    async fn stop(&self) -> Result<(), ProviderError> {
        info!("Stop called; cancelling in-flight operations");
        self.cancel.cancel();
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    #[instrument(skip(self, config), name = "validate_resource_config")]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!(resource_type = %resource_type, "ValidateResourceConfig called");
        let kind = self.registry.resource(resource_type)?;
        let mut diags = Diagnostics::from(validation::validate(&kind.definition().schema, &config));
        if !diags.has_errors() {
            let record = decode(kind, &config)?;
            kind.validate(&record, &mut diags);
        }
        Ok(diags.into_vec())
    }

    #[instrument(skip(self, state), name = "upgrade_resource_state")]
    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        debug!(resource_type = %resource_type, version, "UpgradeResourceState called");
        let kind = self.registry.resource(resource_type)?;
        Ok(backfill_identity(kind, state))
    }

    #[instrument(skip(self, prior_state, proposed_state), name = "plan")]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        debug!(resource_type = %resource_type, "Plan called");
        let kind = self.registry.resource(resource_type)?;
        let block = &kind.definition().schema.block;
        let prior = match prior_state.as_ref().filter(|v| !v.is_null()) {
            Some(value) => Some(decode(kind, value)?),
            None => None,
        };

        if proposed_state.is_null() {
            let changes = prior
                .as_ref()
                .map(|prior| diff(block, Some(prior), &Record::null_for(block)))
                .unwrap_or_default();
            info!(resource_type = %resource_type, "Plan completed: destroy");
            return Ok(PlanResult::with_changes(Value::Null, changes, false));
        }

        let mut diags = Diagnostics::new();
        let mut planned = decode(kind, &proposed_state)?;
        kind.validate(&planned, &mut diags);
        diags.check()?;
        if let Some(prior) = &prior {
            keep_set_order(block, prior, &mut planned);
        }

        let replace = prior
            .as_ref()
            .is_some_and(|prior| forces_replacement(block, prior, &planned));
        seed_computed(block, if replace { None } else { prior.as_ref() }, &mut planned);
        modify_plan(kind, &mut planned, &mut diags);
        null_unechoed(block, &mut planned);
        diags.check()?;

        let changes = diff(block, prior.as_ref(), &planned);
        info!(
            resource_type = %resource_type,
            changes = changes.len(),
            requires_replace = replace,
            "Plan completed"
        );
        let result = if changes.is_empty() {
            PlanResult::no_change(planned.to_host_json())
        } else {
            PlanResult::with_changes(planned.to_host_json(), changes, replace)
        };
        Ok(result.with_diagnostics(diags))
    }

    #[instrument(skip(self, planned_state), name = "create")]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<OperationResult, ProviderError> {
        debug!(resource_type = %resource_type, "Create called");
        let kind = self.registry.resource(resource_type)?;
        let planned = decode(kind, &planned_state)?;
        let transport = self.transport().await?;

        match self.controller(kind, transport.as_ref()).create(planned).await {
            Ok(applied) => {
                info!(resource_type = %resource_type, "Create completed");
                Ok(OperationResult::state(applied.state.to_host_json(), applied.diagnostics))
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Create failed");
                Err(e)
            },
        }
    }

    #[instrument(skip(self, current_state), name = "read")]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<OperationResult, ProviderError> {
        debug!(resource_type = %resource_type, "Read called");
        let kind = self.registry.resource(resource_type)?;
        let prior = decode(kind, &current_state)?;
        let transport = self.transport().await?;

        match self.controller(kind, transport.as_ref()).read(prior).await {
            Ok(ReadOutcome::Present(applied)) => {
                info!(resource_type = %resource_type, "Read completed");
                Ok(OperationResult::state(applied.state.to_host_json(), applied.diagnostics))
            },
            Ok(ReadOutcome::Tombstoned) => {
                info!(resource_type = %resource_type, "Read completed: object no longer exists");
                Ok(OperationResult::gone())
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Read failed");
                Err(e)
            },
        }
    }

    #[instrument(skip(self, prior_state, planned_state), name = "update")]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<OperationResult, ProviderError> {
        debug!(resource_type = %resource_type, "Update called");
        let kind = self.registry.resource(resource_type)?;
        let prior = decode(kind, &prior_state)?;
        let planned = decode(kind, &planned_state)?;
        let transport = self.transport().await?;

        match self.controller(kind, transport.as_ref()).update(prior, planned).await {
            Ok(applied) => {
                info!(resource_type = %resource_type, "Update completed");
                Ok(OperationResult::state(applied.state.to_host_json(), applied.diagnostics))
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Update failed");
                Err(e)
            },
        }
    }

    #[instrument(skip(self, current_state), name = "delete")]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        debug!(resource_type = %resource_type, "Delete called");
        let kind = self.registry.resource(resource_type)?;
        let prior = decode(kind, &current_state)?;
        let transport = self.transport().await?;

        match self.controller(kind, transport.as_ref()).delete(prior).await {
            Ok(()) => {
                info!(resource_type = %resource_type, "Delete completed");
                Ok(())
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Delete failed");
                Err(e)
            },
        }
    }

    #[instrument(skip(self), name = "import_resource")]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        debug!(resource_type = %resource_type, id = %id, "ImportResource called");
        let kind = self.registry.resource(resource_type)?;
        let transport = self.transport().await?;

        match self.controller(kind, transport.as_ref()).import(id).await {
            Ok(applied) => {
                info!(resource_type = %resource_type, id = %id, "ImportResource completed");
                Ok(vec![ImportedResource::new(
                    resource_type,
                    applied.state.to_host_json(),
                )])
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "ImportResource failed");
                Err(e)
            },
        }
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    #[instrument(skip(self, config), name = "validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!(data_source_type = %data_source_type, "ValidateDataSourceConfig called");
        let source = self.registry.data_source(data_source_type)?;
        Ok(validation::validate(source.schema(), &config))
    }

    #[instrument(skip(self, config), name = "read_data_source")]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<OperationResult, ProviderError> {
        debug!(data_source_type = %data_source_type, "ReadDataSource called");
        let source = self.registry.data_source(data_source_type)?;
        let config = Record::from_host_json(&source.schema().block, &config)?;
        let transport = self.transport().await?;

        let mut diags = Diagnostics::new();
        let result = cancellable(
            &self.cancel,
            source.read(config, transport.as_ref(), &mut diags),
        )
        .await;
        match result {
            Ok(state) => {
                info!(data_source_type = %data_source_type, "ReadDataSource completed");
                Ok(OperationResult::state(state.to_host_json(), diags))
            },
            Err(e) => {
                error!(data_source_type = %data_source_type, error = %e, "ReadDataSource failed");
                Err(e.for_resource(data_source_type, None))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFailure, MockTransport, ProviderTester, Verb};
    use crate::transport::ApiPath;
    use crate::value::UNKNOWN_SENTINEL;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    const S3: &str = "galaxy_catalog_s3";
    const CLUSTER: &str = "galaxy_cluster";

    fn tester(transport: &MockTransport) -> ProviderTester<GalaxyProvider> {
        ProviderTester::new(GalaxyProvider::new().with_transport(transport.clone()))
    }

    fn mock() -> MockTransport {
        MockTransport::new()
            .with_collection(&ApiPath::catalog("s3"), "catalogId")
            .with_collection(&ApiPath::new("/cluster"), "clusterId")
            .with_collection(&ApiPath::new("/policy"), "policyId")
    }

    fn lake() -> Value {
        json!({
            "name": "lake",
            "metastore_type": "galaxy",
            "read_only": false,
            "role_arn": "arn:aws:iam::123:role/R",
            "access_key": "AKIA0000",
            "secret_key": "sss",
            "default_bucket": "b",
            "default_data_location": "s3://b/w",
        })
    }

    fn cluster(catalogs: &[&str]) -> Value {
        json!({
            "name": "c",
            "cloud_region_id": "aws-us-east1",
            "min_workers": 1,
            "max_workers": 2,
            "catalog_refs": catalogs,
        })
    }

    fn list_of(state: &Value, name: &str) -> Vec<Value> {
        state[name].as_array().cloned().unwrap_or_default()
    }

    fn has_unknown(value: &Value) -> bool {
        match value {
            Value::String(s) => s == UNKNOWN_SENTINEL,
            Value::Array(items) => items.iter().any(has_unknown),
            Value::Object(map) => map.values().any(has_unknown),
            _ => false,
        }
    }

    #[tokio::test]
    async fn test_role_based_catalog_lifecycle() {
        let transport = mock();
        transport.respond(
            Verb::Create,
            "/catalogType/s3/catalog",
            json!({
                "catalogId": "c1",
                "name": "lake",
                "roleArn": "arn:aws:iam::123:role/R",
                "metastoreType": "galaxy",
                "defaultBucket": "b",
                "defaultDataLocation": "s3://b/w",
                "region": null,
                "hiveMetastoreHost": "",
                "secretKey": "<Value is encrypted>",
            }),
        );
        let tester = tester(&transport);

        let plan = tester.plan_create(S3, lake()).await.unwrap();
        assert_eq!(plan.planned_state["access_key"], Value::Null);
        assert_eq!(plan.planned_state["secret_key"], Value::Null);
        assert_eq!(plan.planned_state["id"], json!(UNKNOWN_SENTINEL));
        assert_eq!(plan.diagnostics.len(), 2);

        let state = tester.create(S3, plan.planned_state).await.unwrap();
        let body = transport.last_body(Verb::Create).unwrap();
        assert_eq!(body["roleArn"], json!("arn:aws:iam::123:role/R"));
        assert!(!body.contains_key("accessKey"));
        assert!(!body.contains_key("secretKey"));

        assert_eq!(state["id"], json!("c1"));
        assert_eq!(state["catalog_id"], json!("c1"));
        assert_eq!(state["role_arn"], json!("arn:aws:iam::123:role/R"));
        assert_eq!(state["access_key"], Value::Null);
        assert_eq!(state["secret_key"], Value::Null);
        assert_eq!(state["region"], Value::Null);
        assert_eq!(state["hive_metastore_host"], Value::Null);
        assert!(!has_unknown(&state));
    }

    #[tokio::test]
    async fn test_cluster_update_preserves_catalog_order() {
        let transport = mock();
        let tester = tester(&transport);
        let created = tester.lifecycle_create(CLUSTER, cluster(&["a", "b", "c"])).await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        let item = ApiPath::new("/cluster").item(&id);

        let mut echo = transport.object(&item).unwrap();
        echo.insert("catalogRefs".into(), json!(["b", "c", "a"]));
        transport.respond(Verb::Update, &item, Value::Object(echo.clone()));
        let plan = tester
            .plan_update(CLUSTER, created.clone(), cluster(&["a", "b", "c"]))
            .await
            .unwrap();
        assert!(plan.changes.is_empty());
        let same = tester
            .update(CLUSTER, created.clone(), plan.planned_state)
            .await
            .unwrap();
        assert_eq!(list_of(&same, "catalog_refs"), vec![json!("a"), json!("b"), json!("c")]);

        echo.insert("catalogRefs".into(), json!(["d", "a", "b"]));
        transport.respond(Verb::Update, &item, Value::Object(echo));
        let plan = tester
            .plan_update(CLUSTER, same.clone(), cluster(&["a", "b", "d"]))
            .await
            .unwrap();
        assert_eq!(plan.changes.len(), 1);
        assert!(!plan.requires_replace);
        let changed = tester.update(CLUSTER, same, plan.planned_state).await.unwrap();
        assert_eq!(list_of(&changed, "catalog_refs"), vec![json!("d"), json!("a"), json!("b")]);
    }

    #[tokio::test]
    async fn test_reordered_catalogs_converge() {
        let transport = mock();
        let tester = tester(&transport);
        let created = tester.lifecycle_create(CLUSTER, cluster(&["a", "b", "c"])).await.unwrap();

        let plan = tester
            .plan_update(CLUSTER, created.clone(), cluster(&["c", "b", "a"]))
            .await
            .unwrap();
        assert!(plan.changes.is_empty(), "unexpected drift: {:?}", plan.changes);
        assert_eq!(
            list_of(&plan.planned_state, "catalog_refs"),
            vec![json!("a"), json!("b"), json!("c")]
        );

        let applied = tester.update(CLUSTER, created, plan.planned_state).await.unwrap();
        let replan = tester
            .plan_update(CLUSTER, applied, cluster(&["c", "b", "a"]))
            .await
            .unwrap();
        assert!(replan.changes.is_empty(), "unexpected drift: {:?}", replan.changes);
    }

    #[tokio::test]
    async fn test_server_order_is_stable_after_set_change() {
        let transport = mock();
        let tester = tester(&transport);
        let created = tester.lifecycle_create(CLUSTER, cluster(&["a", "b", "c"])).await.unwrap();
        let item = ApiPath::new("/cluster").item(created["id"].as_str().unwrap());

        let mut echo = transport.object(&item).unwrap();
        echo.insert("catalogRefs".into(), json!(["d", "a", "b"]));
        transport.respond(Verb::Update, &item, Value::Object(echo));
        let plan = tester
            .plan_update(CLUSTER, created.clone(), cluster(&["a", "b", "d"]))
            .await
            .unwrap();
        let applied = tester.update(CLUSTER, created, plan.planned_state).await.unwrap();

        let replan = tester
            .plan_update(CLUSTER, applied, cluster(&["a", "b", "d"]))
            .await
            .unwrap();
        assert!(replan.changes.is_empty(), "unexpected drift: {:?}", replan.changes);
    }

    #[tokio::test]
    async fn test_read_of_missing_object_tombstones() {
        let transport = mock();
        let tester = tester(&transport);
        transport.fail(Verb::Get, "/catalogType/s3/catalog/p1", MockFailure::NotFound);

        let state = tester.read(S3, json!({"id": "p1", "name": "lake"})).await.unwrap();
        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn test_delete_of_missing_object_succeeds() {
        let transport = mock();
        let tester = tester(&transport);
        assert_ok!(tester.delete(S3, json!({"id": "gone"})).await);
        assert_ok!(tester.delete(S3, json!({"id": "gone"})).await);
    }

    #[tokio::test]
    async fn test_policy_scope_round_trip() {
        let transport = mock();
        let tester = tester(&transport);
        let config = json!({
            "name": "p",
            "predicate": "true",
            "role_id": "r-1",
            "scopes": [{
                "entity_id": "e",
                "entity_kind": "table",
                "privileges": {"grant_kind": "Allow", "privilege": ["SELECT", "INSERT"]},
            }],
        });

        let state = tester.lifecycle_create("galaxy_policy", config.clone()).await.unwrap();
        let body = transport.last_body(Verb::Create).unwrap();
        assert_eq!(body["scopes"][0]["privileges"]["grantKind"], json!("Allow"));
        assert_eq!(
            body["scopes"][0]["privileges"]["privilege"],
            json!(["SELECT", "INSERT"])
        );
        assert_eq!(
            state["scopes"][0]["privileges"]["privilege"],
            json!(["SELECT", "INSERT"])
        );

        let replan = tester.plan_update("galaxy_policy", state.clone(), config).await.unwrap();
        assert!(replan.changes.is_empty(), "unexpected drift: {:?}", replan.changes);
    }

    #[tokio::test]
    async fn test_warp_speed_cluster() {
        let transport = mock();
        let tester = tester(&transport);
        let mut config = cluster(&[]);
        config["processing_mode"] = json!("StandardWarpSpeed");
        config["warp_resiliency_enabled"] = json!(UNKNOWN_SENTINEL);

        let plan = tester.plan_create(CLUSTER, config).await.unwrap();
        assert_eq!(plan.planned_state["warp_resiliency_enabled"], json!(true));
        assert_eq!(plan.planned_state["result_cache_default_visibility_seconds"], Value::Null);

        tester.create(CLUSTER, plan.planned_state).await.unwrap();
        let body = transport.last_body(Verb::Create).unwrap();
        assert_eq!(body["warpResiliencyEnabled"], json!(true));
    }

    #[tokio::test]
    async fn test_disabled_cluster_drops_trino_uri() {
        let transport = mock();
        let tester = tester(&transport);
        let created = tester.lifecycle_create(CLUSTER, cluster(&["a"])).await.unwrap();
        let item = ApiPath::new("/cluster").item(created["id"].as_str().unwrap());

        let mut echo = transport.object(&item).unwrap();
        echo.insert("clusterState".into(), json!("DISABLED"));
        echo.insert("trinoUri".into(), json!("https://c.trino.galaxy.starburst.io"));
        transport.respond(Verb::Update, &item, Value::Object(echo));

        let mut proposed = cluster(&["a"]);
        proposed["max_workers"] = json!(3);
        let plan = tester.plan_update(CLUSTER, created.clone(), proposed).await.unwrap();
        let updated = tester.update(CLUSTER, created, plan.planned_state).await.unwrap();
        assert_eq!(updated["cluster_state"], json!("DISABLED"));
        assert_eq!(updated["trino_uri"], Value::Null);
    }

    #[tokio::test]
    async fn test_force_new_change_requires_replace() {
        let transport = mock();
        let tester = tester(&transport);
        let created = tester.lifecycle_create(CLUSTER, cluster(&[])).await.unwrap();

        let mut proposed = cluster(&[]);
        proposed["cloud_region_id"] = json!("aws-eu-west1");
        let plan = tester.plan_update(CLUSTER, created, proposed).await.unwrap();
        assert!(plan.requires_replace);
        assert_eq!(plan.planned_state["id"], json!(UNKNOWN_SENTINEL));
    }

    #[tokio::test]
    async fn test_plan_is_idempotent() {
        let transport = mock();
        let tester = tester(&transport);
        let first = tester.plan_create(S3, lake()).await.unwrap();
        let second = tester
            .plan_create(S3, first.planned_state.clone())
            .await
            .unwrap();
        assert_eq!(first.planned_state, second.planned_state);
    }

    #[tokio::test]
    async fn test_destroy_plan() {
        let transport = mock();
        let tester = tester(&transport);
        let plan = tester
            .plan_delete(S3, json!({"id": "c1", "name": "lake"}))
            .await
            .unwrap();
        assert_eq!(plan.planned_state, Value::Null);
        assert!(plan.changes.iter().all(|c| c.after.is_none()));
        assert_eq!(plan.changes.len(), 2);
    }

    #[tokio::test]
    async fn test_validation_errors_block_the_plan() {
        let transport = mock();
        let tester = tester(&transport);
        let mut config = lake();
        config["metastore_type"] = json!("hive");
        let err = tester.plan_create(S3, config).await.unwrap_err();
        assert!(err.message().contains("hive_metastore_host"));

        let mut config = lake();
        config["metastore_type"] = json!("delta");
        let err = tester.create(S3, config).await.unwrap_err();
        assert!(err.message().contains("expected one of galaxy, glue, hive"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_validate_resource_config() {
        let tester = tester(&mock());
        assert_ok!(tester.validate_resource_config(S3, lake()).await);

        let mut config = lake();
        config["catalog_id"] = json!("c-1");
        assert_err!(tester.validate_resource_config(S3, config).await);

        let config = json!({"name": "pg", "endpoint": "db", "username": "u", "password": "",
                            "database_name": "d"});
        assert!(tester
            .validate_resource_config("galaxy_catalog_postgresql", config)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_import() {
        let transport = mock();
        transport.insert(
            &ApiPath::new("/cluster"),
            "w-7",
            json!({"clusterId": "w-7", "name": "adopted", "clusterState": "ENABLED",
                   "trinoUri": "https://a", "catalogRefs": ["x"]}),
        );
        let tester = tester(&transport);
        let imported = tester.import_resource(CLUSTER, "w-7").await.unwrap();
        assert_eq!(imported.len(), 1);
        let state = &imported[0].state;
        assert_eq!(state["id"], json!("w-7"));
        assert_eq!(state["cluster_id"], json!("w-7"));
        assert_eq!(state["trino_uri"], json!("https://a"));
        assert_eq!(state["min_workers"], Value::Null);
        assert!(!has_unknown(state));
    }

    #[tokio::test]
    async fn test_upgrade_backfills_identity_mirror() {
        let tester = tester(&mock());
        let upgraded = tester
            .upgrade_resource_state(S3, 0, json!({"id": "c-1", "name": "lake"}))
            .await
            .unwrap();
        assert_eq!(upgraded["catalog_id"], json!("c-1"));

        let upgraded = tester
            .upgrade_resource_state(S3, 0, json!({"catalog_id": "c-2"}))
            .await
            .unwrap();
        assert_eq!(upgraded["id"], json!("c-2"));
    }

    #[tokio::test]
    async fn test_operations_require_configuration() {
        let tester = ProviderTester::new(GalaxyProvider::new());
        let err = tester.read(S3, json!({"id": "c-1"})).await.unwrap_err();
        assert!(matches!(err, ProviderError::FailedPrecondition(_)));
    }

    #[tokio::test]
    async fn test_configure() {
        let tester = ProviderTester::new(GalaxyProvider::new());
        tester
            .configure(json!({
                "domain": "acme.galaxy.starburst.io",
                "client_id": "id",
                "client_secret": "secret",
            }))
            .await
            .unwrap();
        assert!(tester.provider().transport().await.is_ok());

        let err = tester
            .provider()
            .configure(json!({"domain": "acme.galaxy.starburst.io", "page_size": 0,
                              "client_id": "id", "client_secret": "secret"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_stop_cancels_operations() {
        let transport = mock();
        let tester = tester(&transport);
        tester.stop().await.unwrap();
        let err = tester.create(S3, lake()).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_unknown_types() {
        let tester = tester(&mock());
        let err = tester.plan_create("galaxy_widget", json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
        assert_err!(tester.read_data_source("galaxy_widget_list", json!({})).await);
    }

    #[tokio::test]
    async fn test_read_data_source() {
        let transport = mock();
        transport.respond(
            Verb::List,
            "/cluster",
            json!([{"clusterId": "w-1", "name": "a", "clusterState": "ENABLED"}]),
        );
        let tester = tester(&transport);
        let state = tester
            .read_data_source("galaxy_cluster_list", json!({}))
            .await
            .unwrap();
        let result = list_of(&state, "result");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["cluster_id"], json!("w-1"));
        assert_eq!(result[0]["trino_uri"], Value::Null);
    }

    #[test]
    fn test_metadata_lists_galaxy_types() {
        let provider = GalaxyProvider::new();
        let metadata = provider.metadata();
        assert_eq!(metadata.resources.len(), 21);
        assert!(metadata.resources.iter().all(|name| name.starts_with("galaxy_")));
        assert!(metadata
            .data_sources
            .contains(&"galaxy_catalog_validation".to_string()));
    }
}
