//! Testing utilities for provider implementations.
//!
//! [`ProviderTester`] drives a `ProviderService` implementation the way the
//! host would. [`MockTransport`] stands in for the Platform API: it stores
//! created objects in memory, echoes them back on read, and lets a test
//! inject canned responses or failures per verb and path.
//!
//! # Example
//!
//! ```ignore
//! use galaxy_provider::testing::{MockTransport, ProviderTester};
//! use galaxy_provider::GalaxyProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_cluster() {
//!     let transport = MockTransport::new();
//!     let tester = ProviderTester::new(GalaxyProvider::with_transport(transport.clone()));
//!
//!     let state = tester
//!         .lifecycle_create("galaxy_cluster", json!({"name": "etl"}))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["name"], "etl");
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticSeverity};
use crate::error::ProviderError;
use crate::schema::ProviderSchema;
use crate::service::ProviderService;
use crate::transport::{ApiPath, JsonObject, Transport};
use crate::types::{ImportedResource, OperationResult, PlanResult};

/// A test harness for provider implementations.
///
/// This wraps a `ProviderService` implementation and provides
/// simplified methods for testing without a host.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration.
    ///
    /// Returns `Err` with the diagnostics if there are errors.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    ///
    /// Returns `Err` with the diagnostics if there are errors.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, None, proposed_state).await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), proposed_state)
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null)
            .await
    }

    /// Create a new resource, returning its state.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let result = self.provider.create(resource_type, planned_state).await?;
        expect_state(resource_type, result)
    }

    /// Read the current state of a resource; `None` once it is gone.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        Ok(self.provider.read(resource_type, current_state).await?.state)
    }

    /// Update an existing resource, returning its state.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let result = self
            .provider
            .update(resource_type, prior_state, planned_state)
            .await?;
        expect_state(resource_type, result)
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Upgrade resource state from an older schema version.
    pub async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .upgrade_resource_state(resource_type, version, state)
            .await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let result = self
            .provider
            .read_data_source(data_source_type, config)
            .await?;
        expect_state(data_source_type, result)
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run a full create lifecycle: plan → create → read.
    ///
    /// Returns the final state after read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self.plan_create(resource_type, config).await?;
        let created_state = self
            .create(resource_type, plan_result.planned_state)
            .await?;
        self.read_existing(resource_type, created_state).await
    }

    /// Run a full update lifecycle: plan → update → read.
    ///
    /// Returns the final state after read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        let updated_state = self
            .update(resource_type, prior_state, plan_result.planned_state)
            .await?;
        self.read_existing(resource_type, updated_state).await
    }

    /// Run a full delete lifecycle: plan → delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        let _ = self
            .plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }

    /// Run a full CRUD lifecycle: create → read → update → read → delete.
    ///
    /// Returns the state after the update (before delete).
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created_state = self.lifecycle_create(resource_type, initial_config).await?;
        let updated_state = self
            .lifecycle_update(resource_type, created_state, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated_state.clone())
            .await?;
        Ok(updated_state)
    }

    async fn read_existing(
        &self,
        resource_type: &str,
        state: Value,
    ) -> Result<Value, ProviderError> {
        self.read(resource_type, state)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{resource_type} vanished after apply")))
    }
}

fn expect_state(type_name: &str, result: OperationResult) -> Result<Value, ProviderError> {
    result
        .state
        .ok_or_else(|| ProviderError::NotFound(format!("{type_name} returned no state")))
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

/// Check diagnostics and return an error if there are any errors.
fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Mock Transport
// =========================================================================

/// The kind of call a [`MockTransport`] received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `get` or `get_object`.
    Get,
    /// `create`.
    Create,
    /// `update`.
    Update,
    /// `delete`.
    Delete,
    /// `list_all`.
    List,
    /// `post_action`.
    Action,
}

/// A failure injected into a [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Answer as if the object does not exist.
    NotFound,
    /// Answer 403.
    PermissionDenied,
    /// Answer 409.
    Conflict,
    /// Answer 503.
    Unavailable,
    /// Answer 400 with a message.
    InvalidRequest(String),
}

impl MockFailure {
    fn to_error(&self, path: &str) -> ProviderError {
        match self {
            Self::NotFound => ProviderError::NotFound(path.to_string()),
            Self::PermissionDenied => ProviderError::PermissionDenied(path.to_string()),
            Self::Conflict => ProviderError::AlreadyExists(path.to_string()),
            Self::Unavailable => ProviderError::Unavailable(path.to_string()),
            Self::InvalidRequest(message) => ProviderError::InvalidRequest(message.clone()),
        }
    }
}

/// One call recorded by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The call kind.
    pub verb: Verb,
    /// The path, including the item id for item calls.
    pub path: String,
    /// The request body, for create, update and actions.
    pub body: Option<JsonObject>,
}

#[derive(Default)]
struct MockState {
    id_keys: HashMap<String, String>,
    objects: BTreeMap<String, JsonObject>,
    responses: HashMap<(Verb, String), Value>,
    failures: HashMap<(Verb, String), MockFailure>,
    requests: Vec<MockRequest>,
    next_id: u64,
}

impl MockState {
    fn record(&mut self, verb: Verb, path: &str, body: Option<&JsonObject>) -> Result<(), ProviderError> {
        self.requests.push(MockRequest {
            verb,
            path: path.to_string(),
            body: body.cloned(),
        });
        match self.failures.get(&(verb, path.to_string())) {
            Some(failure) => Err(failure.to_error(path)),
            None => Ok(()),
        }
    }

    fn canned(&self, verb: Verb, path: &str) -> Option<Value> {
        self.responses.get(&(verb, path.to_string())).cloned()
    }
}

/// An in-memory Platform API.
///
/// Clones share state, so a test can keep a handle while the provider
/// owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create an empty API.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the identity field the collection at `path` assigns on create.
    ///
    /// Collections without one use `id`.
    pub fn with_collection(self, path: &ApiPath, id_key: &str) -> Self {
        self.lock()
            .id_keys
            .insert(path.collection().to_string(), id_key.to_string());
        self
    }

    /// Seed an existing object.
    pub fn insert(&self, path: &ApiPath, id: &str, object: Value) {
        if let Value::Object(object) = object {
            self.lock().objects.insert(path.item(id), object);
        }
    }

    /// Answer every `verb` call on `path` with `response`.
    pub fn respond(&self, verb: Verb, path: &str, response: Value) {
        self.lock().responses.insert((verb, path.to_string()), response);
    }

    /// Fail every `verb` call on `path`.
    pub fn fail(&self, verb: Verb, path: &str, failure: MockFailure) {
        self.lock().failures.insert((verb, path.to_string()), failure);
    }

    /// The stored object at an item path.
    pub fn object(&self, path: &str) -> Option<JsonObject> {
        self.lock().objects.get(path).cloned()
    }

    /// Every call received so far, in order.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.lock().requests.clone()
    }

    /// The body of the most recent `verb` call.
    pub fn last_body(&self, verb: Verb) -> Option<JsonObject> {
        self.lock()
            .requests
            .iter()
            .rev()
            .find(|r| r.verb == verb)
            .and_then(|r| r.body.clone())
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn into_object(path: &str, value: Value) -> Result<JsonObject, ProviderError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ProviderError::Sdk(format!(
            "mock response for {path} is not an object: {other}"
        ))),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &ApiPath, id: &str) -> Result<JsonObject, ProviderError> {
        self.get_object(&path.item(id)).await
    }

    async fn create(&self, path: &ApiPath, body: JsonObject) -> Result<JsonObject, ProviderError> {
        let mut state = self.lock();
        state.record(Verb::Create, path.collection(), Some(&body))?;
        if let Some(response) = state.canned(Verb::Create, path.collection()) {
            return into_object(path.collection(), response);
        }

        state.next_id += 1;
        let id = format!("mock-{}", state.next_id);
        let key = state
            .id_keys
            .get(path.collection())
            .cloned()
            .unwrap_or_else(|| "id".to_string());
        let mut object = body;
        object.insert(key, Value::String(id.clone()));
        state.objects.insert(path.item(&id), object.clone());
        Ok(object)
    }

    async fn update(
        &self,
        path: &ApiPath,
        id: &str,
        body: JsonObject,
    ) -> Result<JsonObject, ProviderError> {
        let item = path.item(id);
        let mut state = self.lock();
        state.record(Verb::Update, &item, Some(&body))?;
        if let Some(response) = state.canned(Verb::Update, &item) {
            return into_object(&item, response);
        }

        let stored = state
            .objects
            .get_mut(&item)
            .ok_or_else(|| ProviderError::NotFound(item.clone()))?;
        stored.extend(body);
        Ok(stored.clone())
    }

    async fn delete(&self, path: &ApiPath, id: &str) -> Result<(), ProviderError> {
        let item = path.item(id);
        let mut state = self.lock();
        state.record(Verb::Delete, &item, None)?;
        state
            .objects
            .remove(&item)
            .map(|_| ())
            .ok_or(ProviderError::NotFound(item))
    }

    async fn list_all(&self, path: &str) -> Result<Vec<Value>, ProviderError> {
        let mut state = self.lock();
        state.record(Verb::List, path, None)?;
        if let Some(response) = state.canned(Verb::List, path) {
            return match response {
                Value::Array(items) => Ok(items),
                other => Err(ProviderError::Sdk(format!(
                    "mock listing for {path} is not an array: {other}"
                ))),
            };
        }

        let collection = path.split('?').next().unwrap_or(path);
        let prefix = format!("{collection}/");
        Ok(state
            .objects
            .iter()
            .filter(|(item, _)| {
                item.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/'))
            })
            .map(|(_, object)| Value::Object(object.clone()))
            .collect())
    }

    async fn get_object(&self, path: &str) -> Result<JsonObject, ProviderError> {
        let mut state = self.lock();
        state.record(Verb::Get, path, None)?;
        if let Some(response) = state.canned(Verb::Get, path) {
            return into_object(path, response);
        }
        state
            .objects
            .get(path)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }

    async fn post_action(&self, path: &str, body: JsonObject) -> Result<JsonObject, ProviderError> {
        let mut state = self.lock();
        state.record(Verb::Action, path, Some(&body))?;
        match state.canned(Verb::Action, path) {
            Some(response) => into_object(path, response),
            None => Err(ProviderError::NotFound(path.to_string())),
        }
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan result indicates the resource will be created.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(
        !plan.requires_replace,
        "Expected plan to create, not replace"
    );
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan result indicates changes are needed.
///
/// # Panics
///
/// Panics if the plan has no changes.
pub fn assert_plan_has_changes(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes, but got no changes"
    );
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan does not require resource replacement.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan does not have a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan has a change for the given path.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        !has_change,
        "Expected plan to not change attribute '{}', but it was changed",
        path
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    let has_errors = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error));

    assert!(has_errors, "Expected at least one error, but got none");
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error) && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
