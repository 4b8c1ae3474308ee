//! The resource controller.
//!
//! Drives one managed record through create, read, update, delete and
//! import against the Platform API. Each operation validates, builds a
//! request, calls the transport, projects the response and asserts that no
//! `Unknown` survives into the resulting state. The controller holds no
//! state between calls; the host persists whatever it returns.

use std::future::Future;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::builder::{build_request, has_deferred_fields};
use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::kind::{Operation, ResourceKind};
use crate::plan::{modify_plan, null_unechoed};
use crate::projector::{project, project_response, Shape};
use crate::record::Record;
use crate::schema::{to_camel_case, Block};
use crate::transport::Transport;

/// Where a managed record stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No remote object exists.
    Absent,
    /// A create request is in flight.
    Creating,
    /// The remote object exists and state tracks it.
    Present,
    /// An update request is in flight.
    Updating,
    /// A delete request is in flight.
    Deleting,
    /// The remote object is gone; state must be dropped.
    Tombstoned,
}

/// An event that moves a record between lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A create was requested.
    Create,
    /// A refresh was requested.
    Read,
    /// An update was requested.
    Update,
    /// A delete was requested.
    Delete,
    /// The in-flight request succeeded.
    Succeeded,
    /// The in-flight request failed.
    Failed,
    /// The server reported the object as absent.
    Vanished,
}

impl LifecycleState {
    /// Apply an event, rejecting transitions the lifecycle does not allow.
    pub fn transition(self, event: LifecycleEvent) -> Result<Self, ProviderError> {
        use LifecycleEvent as E;
        use LifecycleState as S;

        let next = match (self, event) {
            (S::Absent, E::Create) => S::Creating,
            (S::Creating, E::Succeeded) => S::Present,
            (S::Creating, E::Failed) => S::Absent,
            (S::Present, E::Read) => S::Present,
            (S::Present, E::Update) => S::Updating,
            (S::Updating, E::Succeeded) | (S::Updating, E::Failed) => S::Present,
            (S::Updating, E::Vanished) => S::Tombstoned,
            (S::Present, E::Vanished) => S::Tombstoned,
            (S::Present, E::Delete) => S::Deleting,
            (S::Deleting, E::Succeeded) | (S::Deleting, E::Vanished) => S::Tombstoned,
            (S::Deleting, E::Failed) => S::Present,
            (state, event) => {
                return Err(ProviderError::Sdk(format!(
                    "invalid lifecycle transition: {event:?} in state {state:?}"
                )))
            },
        };
        Ok(next)
    }
}

/// Tracks one record's lifecycle and logs every move.
struct Lifecycle<'a> {
    kind: &'a str,
    state: LifecycleState,
}

impl<'a> Lifecycle<'a> {
    fn new(kind: &'a str, state: LifecycleState) -> Self {
        Self { kind, state }
    }

    fn advance(&mut self, event: LifecycleEvent) -> Result<LifecycleState, ProviderError> {
        let next = self.state.transition(event)?;
        debug!(kind = self.kind, from = ?self.state, to = ?next, ?event, "lifecycle transition");
        self.state = next;
        Ok(next)
    }

    /// Record a failure; the original error is what the caller reports.
    fn fail(&mut self, event: LifecycleEvent) {
        if let Ok(next) = self.state.transition(event) {
            debug!(kind = self.kind, from = ?self.state, to = ?next, ?event, "lifecycle transition");
            self.state = next;
        }
    }
}

/// The result of a successful apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// The new state, free of `Unknown`.
    pub state: Record,
    /// Warnings produced along the way.
    pub diagnostics: Diagnostics,
}

/// The result of a refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The object exists; here is its refreshed state.
    Present(Applied),
    /// The object is gone and its state should be dropped.
    Tombstoned,
}

/// Await `fut` unless `token` is cancelled first.
pub async fn cancellable<T>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ProviderError::Cancelled("operation cancelled by the host".into())),
        result = fut => result,
    }
}

/// CRUD state machine for one resource kind.
pub struct ResourceController<'a> {
    kind: &'a dyn ResourceKind,
    transport: &'a dyn Transport,
    cancel: CancellationToken,
}

impl<'a> ResourceController<'a> {
    /// A controller for `kind` over `transport`, observing `cancel`.
    pub fn new(
        kind: &'a dyn ResourceKind,
        transport: &'a dyn Transport,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            kind,
            transport,
            cancel,
        }
    }

    fn kind_name(&self) -> &'static str {
        self.kind.definition().kind
    }

    fn checkpoint(&self) -> Result<(), ProviderError> {
        if self.cancel.is_cancelled() {
            Err(ProviderError::Cancelled("operation cancelled by the host".into()))
        } else {
            Ok(())
        }
    }

    /// Validation and plan normalization shared by create and update.
    fn prepare(&self, record: &mut Record, diags: &mut Diagnostics) -> Result<(), ProviderError> {
        self.kind.validate(record, diags);
        diags.check()?;
        modify_plan(self.kind, record, diags);
        null_unechoed(&self.kind.definition().schema.block, record);
        diags.check()
    }

    /// Create the remote object described by `planned`.
    #[instrument(skip_all, fields(kind = self.kind_name()))]
    pub async fn create(&self, planned: Record) -> Result<Applied, ProviderError> {
        let mut lifecycle = Lifecycle::new(self.kind_name(), LifecycleState::Absent);
        lifecycle.advance(LifecycleEvent::Create)?;

        match self.apply_create(planned).await {
            Ok(applied) => {
                lifecycle.advance(LifecycleEvent::Succeeded)?;
                let id = self.kind.definition().identity.of(&applied.state).unwrap_or_default();
                info!(kind = self.kind_name(), id = %id, "created");
                Ok(applied)
            },
            Err(err) => {
                lifecycle.fail(LifecycleEvent::Failed);
                Err(err.for_resource(self.kind_name(), None))
            },
        }
    }

    async fn apply_create(&self, planned: Record) -> Result<Applied, ProviderError> {
        let def = self.kind.definition();
        let mut diags = Diagnostics::new();
        let mut record = planned;

        self.checkpoint()?;
        self.prepare(&mut record, &mut diags)?;
        let body = build_request(self.kind, &record, Operation::Create, &mut diags)?;

        self.checkpoint()?;
        let response = cancellable(&self.cancel, self.transport.create(&def.family, body)).await?;
        project_response(self.kind, &mut record, &response, true, &mut diags)?;

        if has_deferred_fields(self.kind, &record) {
            let id = def.identity.of(&record).unwrap_or_default().to_string();
            debug!(kind = def.kind, id = %id, "applying fields the create body leaves out");
            let mut patched = record.clone();
            match self.apply_deferred(&id, &mut patched, &mut diags).await {
                Ok(()) => record = patched,
                Err(err) => {
                    let skipped = unset_deferred_fields(&def.schema.block, &mut record);
                    warn!(kind = def.kind, id = %id, error = %err, "created without deferred fields");
                    diags.warning(
                        "",
                        format!(
                            "{} {} was created but {} could not be applied ({}); \
                             the next apply retries them",
                            def.kind,
                            id,
                            skipped.join(", "),
                            err.message()
                        ),
                    );
                },
            }
        }

        ensure_resolved(&record)?;
        Ok(Applied {
            state: record,
            diagnostics: diags,
        })
    }

    /// PATCH the fields a create body leaves out.
    async fn apply_deferred(
        &self,
        id: &str,
        record: &mut Record,
        diags: &mut Diagnostics,
    ) -> Result<(), ProviderError> {
        let def = self.kind.definition();
        let body = build_request(self.kind, record, Operation::Update, diags)?;
        self.checkpoint()?;
        let response =
            cancellable(&self.cancel, self.transport.update(&def.family, id, body)).await?;
        project_response(self.kind, record, &response, false, diags)
    }

    /// Refresh `prior` from the server.
    #[instrument(skip_all, fields(kind = self.kind_name()))]
    pub async fn read(&self, prior: Record) -> Result<ReadOutcome, ProviderError> {
        let def = self.kind.definition();
        let id = self.identity(&prior)?;
        let mut lifecycle = Lifecycle::new(def.kind, LifecycleState::Present);

        self.checkpoint().map_err(|e| e.for_resource(def.kind, Some(&id)))?;
        let response = match cancellable(&self.cancel, self.transport.get(&def.family, &id)).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => {
                lifecycle.advance(LifecycleEvent::Vanished)?;
                info!(kind = def.kind, id = %id, "remote object is gone; dropping state");
                return Ok(ReadOutcome::Tombstoned);
            },
            Err(err) => return Err(err.for_resource(def.kind, Some(&id))),
        };

        lifecycle.advance(LifecycleEvent::Read)?;
        let mut diags = Diagnostics::new();
        let mut record = prior;
        project_response(self.kind, &mut record, &response, false, &mut diags)
            .map_err(|e| e.for_resource(def.kind, Some(&id)))?;
        ensure_resolved(&record).map_err(|e| e.for_resource(def.kind, Some(&id)))?;
        Ok(ReadOutcome::Present(Applied {
            state: record,
            diagnostics: diags,
        }))
    }

    /// Bring the remote object in line with `planned`.
    #[instrument(skip_all, fields(kind = self.kind_name()))]
    pub async fn update(&self, prior: Record, planned: Record) -> Result<Applied, ProviderError> {
        let def = self.kind.definition();
        let id = self.identity(&prior)?;
        let mut lifecycle = Lifecycle::new(def.kind, LifecycleState::Present);
        lifecycle.advance(LifecycleEvent::Update)?;

        match self.apply_update(&id, &prior, planned).await {
            Ok(applied) => {
                lifecycle.advance(LifecycleEvent::Succeeded)?;
                info!(kind = def.kind, id = %id, "updated");
                Ok(applied)
            },
            Err(err) => {
                let event = if err.is_not_found() {
                    LifecycleEvent::Vanished
                } else {
                    LifecycleEvent::Failed
                };
                lifecycle.fail(event);
                Err(err.for_resource(def.kind, Some(&id)))
            },
        }
    }

    async fn apply_update(
        &self,
        id: &str,
        prior: &Record,
        planned: Record,
    ) -> Result<Applied, ProviderError> {
        let def = self.kind.definition();
        let mut diags = Diagnostics::new();
        let mut record = planned;
        if def.identity.of(&record).is_none() {
            def.identity.assign(&mut record, id);
        }

        self.checkpoint()?;
        self.prepare(&mut record, &mut diags)?;
        let body = build_request(self.kind, &record, Operation::Update, &mut diags)?;

        self.checkpoint()?;
        let response =
            cancellable(&self.cancel, self.transport.update(&def.family, id, body)).await?;
        order_sets_by_state(&def.schema.block, prior, &mut record, &response);
        project_response(self.kind, &mut record, &response, false, &mut diags)?;

        ensure_resolved(&record)?;
        Ok(Applied {
            state: record,
            diagnostics: diags,
        })
    }

    /// Delete the remote object. An already-absent object counts as deleted.
    #[instrument(skip_all, fields(kind = self.kind_name()))]
    pub async fn delete(&self, prior: Record) -> Result<(), ProviderError> {
        let def = self.kind.definition();
        let id = self.identity(&prior)?;
        let mut lifecycle = Lifecycle::new(def.kind, LifecycleState::Present);
        lifecycle.advance(LifecycleEvent::Delete)?;

        self.checkpoint().map_err(|e| e.for_resource(def.kind, Some(&id)))?;
        match cancellable(&self.cancel, self.transport.delete(&def.family, &id)).await {
            Ok(()) => {
                lifecycle.advance(LifecycleEvent::Succeeded)?;
                info!(kind = def.kind, id = %id, "deleted");
                Ok(())
            },
            Err(err) if err.is_not_found() => {
                lifecycle.advance(LifecycleEvent::Vanished)?;
                debug!(kind = def.kind, id = %id, "already deleted");
                Ok(())
            },
            Err(err) => {
                lifecycle.fail(LifecycleEvent::Failed);
                Err(err.for_resource(def.kind, Some(&id)))
            },
        }
    }

    /// Adopt an existing object by identifier.
    #[instrument(skip_all, fields(kind = self.kind_name(), id = %id))]
    pub async fn import(&self, id: &str) -> Result<Applied, ProviderError> {
        let def = self.kind.definition();
        if !def.importable {
            return Err(ProviderError::Unimplemented(format!(
                "{} does not support import",
                def.kind
            )));
        }
        if id.trim().is_empty() {
            return Err(ProviderError::Validation("import requires an identifier".into()));
        }

        self.checkpoint().map_err(|e| e.for_resource(def.kind, Some(id)))?;
        let response = cancellable(&self.cancel, self.transport.get(&def.family, id))
            .await
            .map_err(|e| e.for_resource(def.kind, Some(id)))?;

        let mut diags = Diagnostics::new();
        let mut record = Record::unknown_for(&def.schema.block);
        def.identity.assign(&mut record, id);
        project(Shape::of(self.kind), &mut record, &response, false, &mut diags)
            .map_err(|e| e.for_resource(def.kind, Some(id)))?;
        record.resolve_unknowns();
        self.kind.after_projection(&mut record, &response);
        info!(kind = def.kind, id = %id, "imported");
        Ok(Applied {
            state: record,
            diagnostics: diags,
        })
    }

    fn identity(&self, record: &Record) -> Result<String, ProviderError> {
        let def = self.kind.definition();
        def.identity
            .of(record)
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Validation(format!(
                    "state has no {}; the resource must be created or imported first",
                    def.identity.attribute
                ))
                .for_resource(def.kind, None)
            })
    }
}

/// Compare echoed set-like lists against the stored state, not the plan.
///
/// A reordered echo of what was stored keeps the stored order; once the
/// elements differ from the stored state the server's order is taken.
fn order_sets_by_state(
    block: &Block,
    prior: &Record,
    record: &mut Record,
    response: &Map<String, Value>,
) {
    for (name, attr) in &block.attributes {
        if !attr.preserves_order() || !prior.get(name).is_known() {
            continue;
        }
        let key = attr.api_name.clone().unwrap_or_else(|| to_camel_case(name));
        if response.get(&key).is_some_and(Value::is_array) {
            record.set(name, prior.get(name).clone());
        }
    }
}

/// Null every create-omitted attribute so state records it as unapplied.
fn unset_deferred_fields(block: &Block, record: &mut Record) -> Vec<String> {
    let mut skipped = Vec::new();
    for (name, attr) in &block.attributes {
        if attr.omit_on_create && record.is_set(name) {
            record.set_null(name);
            skipped.push(name.clone());
        }
    }
    skipped
}

/// Fail if any `Unknown` survived reconciliation.
fn ensure_resolved(record: &Record) -> Result<(), ProviderError> {
    let unresolved = record.unknown_paths();
    if unresolved.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::Sdk(format!(
            "reconciled state still has unknown values at: {}",
            unresolved.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Identity, KindDefinition};
    use crate::schema::{Attribute, Schema};
    use crate::testing::{MockFailure, MockTransport, Verb};
    use crate::transport::ApiPath;
    use crate::value::Attr;
    use serde_json::{json, Value};

    struct Note(KindDefinition);

    impl ResourceKind for Note {
        fn definition(&self) -> &KindDefinition {
            &self.0
        }
    }

    fn note() -> Note {
        let schema = Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("note_id", Attribute::computed_string())
            .with_attribute("title", Attribute::required_string())
            .with_attribute("body", Attribute::optional_string())
            .with_attribute("token", Attribute::optional_secret())
            .with_attribute("pinned", Attribute::optional_computed_bool())
            .with_attribute("expiry", Attribute::optional_computed_int64().not_echoed())
            .with_attribute("folder", Attribute::optional_string().omit_on_create())
            .with_attribute("created_on", Attribute::computed_string());
        Note(KindDefinition::new(
            "note",
            ApiPath::new("/note"),
            Identity::mirrored("noteId", "note_id"),
            schema,
        ))
    }

    fn planned() -> Record {
        Record::null_for(&note().0.schema.block)
            .with_attr("id", Attr::Unknown)
            .with_attr("note_id", Attr::Unknown)
            .with("title", "hello")
            .with("token", "s3cret")
            .with_attr("pinned", Attr::Unknown)
            .with_attr("expiry", Attr::Unknown)
            .with_attr("created_on", Attr::Unknown)
    }

    fn transport() -> MockTransport {
        MockTransport::new().with_collection(&ApiPath::new("/note"), "noteId")
    }

    #[test]
    fn test_lifecycle_transitions() {
        use LifecycleEvent as E;
        use LifecycleState as S;
        assert_eq!(S::Absent.transition(E::Create).unwrap(), S::Creating);
        assert_eq!(S::Creating.transition(E::Succeeded).unwrap(), S::Present);
        assert_eq!(S::Present.transition(E::Vanished).unwrap(), S::Tombstoned);
        assert_eq!(S::Deleting.transition(E::Vanished).unwrap(), S::Tombstoned);
        assert!(S::Tombstoned.transition(E::Update).is_err());
        assert!(S::Absent.transition(E::Delete).is_err());
    }

    #[tokio::test]
    async fn test_create_resolves_every_unknown() {
        let kind = note();
        let transport = transport();
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());

        let applied = controller.create(planned()).await.unwrap();
        let state = applied.state;
        assert!(state.unknown_paths().is_empty());
        assert_eq!(state.get_str("id"), state.get_str("note_id"));
        assert_eq!(state.get_str("token"), Some("s3cret"));
        assert!(state.get("expiry").is_null());
        assert!(state.get("pinned").is_null());

        let body = transport.last_body(Verb::Create).unwrap();
        assert_eq!(Value::Object(body), json!({"title": "hello", "token": "s3cret"}));
    }

    #[tokio::test]
    async fn test_create_applies_deferred_fields() {
        let kind = note();
        let transport = transport();
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());

        let applied = controller
            .create(planned().with("folder", "inbox"))
            .await
            .unwrap();
        assert_eq!(applied.state.get_str("folder"), Some("inbox"));
        let update = transport.last_body(Verb::Update).unwrap();
        assert_eq!(update["folder"], json!("inbox"));
        assert!(!transport.last_body(Verb::Create).unwrap().contains_key("folder"));
    }

    #[tokio::test]
    async fn test_create_without_identity_fails() {
        let kind = note();
        let transport = transport();
        transport.respond(Verb::Create, "/note", json!({"title": "hello"}));
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());

        let err = controller.create(planned()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Resource { .. }));
        assert!(err.message().contains("noteId"));
    }

    #[tokio::test]
    async fn test_read_tombstones_missing_object() {
        let kind = note();
        let transport = transport();
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());

        let prior = Record::new().with("id", "n-404").with("title", "gone");
        let outcome = controller.read(prior).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Tombstoned);
    }

    #[tokio::test]
    async fn test_read_preserves_unechoed_configuration() {
        let kind = note();
        let transport = transport();
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());
        let created = controller.create(planned().with("body", "text")).await.unwrap().state;

        let id = created.get_str("id").unwrap().to_string();
        transport.respond(
            Verb::Get,
            &format!("/note/{id}"),
            json!({"noteId": id, "title": "hello", "createdOn": "today"}),
        );
        let ReadOutcome::Present(read) = controller.read(created.clone()).await.unwrap() else {
            panic!("expected the note to exist");
        };
        assert_eq!(read.state.get_str("body"), Some("text"));
        assert_eq!(read.state.get_str("token"), Some("s3cret"));
        assert_eq!(read.state.get_str("created_on"), Some("today"));
    }

    #[tokio::test]
    async fn test_update_sends_patch() {
        let kind = note();
        let transport = transport();
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());
        let created = controller.create(planned()).await.unwrap().state;

        let mut desired = created.clone();
        desired.set_known("title", "renamed");
        let updated = controller.update(created, desired).await.unwrap();
        assert_eq!(updated.state.get_str("title"), Some("renamed"));
        assert_eq!(transport.last_body(Verb::Update).unwrap()["title"], json!("renamed"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let kind = note();
        let transport = transport();
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());
        let created = controller.create(planned()).await.unwrap().state;

        controller.delete(created.clone()).await.unwrap();
        controller.delete(created).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_propagates_other_failures() {
        let kind = note();
        let transport = transport();
        transport.fail(Verb::Delete, "/note/n-1", MockFailure::Unavailable);
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());

        let err = controller.delete(Record::new().with("id", "n-1")).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Resource { ref source, .. } if matches!(**source, ProviderError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let kind = note();
        let transport = transport();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let controller = ResourceController::new(&kind, &transport, cancel);

        let err = controller.create(planned()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_import_uses_listing_semantics() {
        let kind = note();
        let transport = transport();
        transport.respond(
            Verb::Get,
            "/note/n-7",
            json!({"noteId": "n-7", "title": "adopted", "pinned": true}),
        );
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());

        let applied = controller.import("n-7").await.unwrap();
        assert_eq!(applied.state.get_str("note_id"), Some("n-7"));
        assert_eq!(applied.state.get_bool("pinned"), Some(true));
        assert!(applied.state.get("token").is_null());
        assert!(applied.state.unknown_paths().is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors_stop_before_network() {
        let kind = note();
        let transport = transport();
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());

        let err = controller.create(planned().with_attr("title", Attr::Null)).await.unwrap_err();
        assert!(err.message().contains("title is required"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancellable_returns_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<(), ProviderError> =
            cancellable(&token, std::future::pending()).await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_failed_deferred_update_keeps_created_object() {
        let kind = note();
        let transport = transport();
        transport.respond(Verb::Create, "/note", json!({"noteId": "n-9", "title": "hello"}));
        transport.fail(Verb::Update, "/note/n-9", MockFailure::Unavailable);
        let controller = ResourceController::new(&kind, &transport, CancellationToken::new());

        let applied = controller
            .create(planned().with("folder", "inbox"))
            .await
            .unwrap();
        assert_eq!(applied.state.get_str("id"), Some("n-9"));
        assert_eq!(applied.state.get_str("note_id"), Some("n-9"));
        assert!(applied.state.get("folder").is_null());
        assert!(applied.state.unknown_paths().is_empty());
        assert!(!applied.diagnostics.has_errors());
        let warning = applied.diagnostics.warnings().next().unwrap();
        assert!(warning.summary.contains("folder"));

        let verbs: Vec<Verb> = transport.requests().iter().map(|r| r.verb).collect();
        assert_eq!(verbs, vec![Verb::Create, Verb::Update]);
    }
}
