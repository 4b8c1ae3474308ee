//! Resource kinds.
//!
//! A resource kind bundles everything the reconciliation engine needs to
//! know about one type of Platform object: its schema, the API collection it
//! lives in, how its identity appears in responses, and any tagged-union or
//! mutual-exclusion rules. Kind-specific business rules hook in through the
//! default methods of [`ResourceKind`].

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;
use crate::discriminator::Discriminator;
use crate::plan::MutualExclusion;
use crate::record::Record;
use crate::schema::Schema;
use crate::transport::ApiPath;

/// Whether a request body is being built for a create or an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A create (`POST`) body.
    Create,
    /// An update (`PATCH`) body.
    Update,
}

/// Where a kind's server-assigned identifier lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The key carrying the identifier in API responses, e.g. `catalogId`.
    pub response_key: &'static str,
    /// The state attribute holding the identifier.
    pub attribute: &'static str,
    /// A second state attribute mirroring the identifier.
    pub mirror: Option<&'static str>,
}

impl Identity {
    /// An identity stored in `id` and mirrored to `mirror`.
    pub fn mirrored(response_key: &'static str, mirror: &'static str) -> Self {
        Self {
            response_key,
            attribute: "id",
            mirror: Some(mirror),
        }
    }

    /// An identity stored in `id` only.
    pub fn plain(response_key: &'static str) -> Self {
        Self {
            response_key,
            attribute: "id",
            mirror: None,
        }
    }

    /// The identifier held by a record, from the identity attribute or its mirror.
    pub fn of<'r>(&self, record: &'r Record) -> Option<&'r str> {
        record
            .get_str(self.attribute)
            .filter(|id| !id.is_empty())
            .or_else(|| {
                self.mirror
                    .and_then(|m| record.get_str(m))
                    .filter(|id| !id.is_empty())
            })
    }

    /// Store an identifier in the identity attribute and its mirror.
    pub fn assign(&self, record: &mut Record, id: &str) {
        record.set_known(self.attribute, id);
        if let Some(mirror) = self.mirror {
            record.set_known(mirror, id);
        }
    }

    /// Whether `name` is the identity attribute or its mirror.
    pub fn covers(&self, name: &str) -> bool {
        name == self.attribute || self.mirror == Some(name)
    }
}

/// The static description of a resource kind.
#[derive(Debug, Clone)]
pub struct KindDefinition {
    /// The kind name, e.g. `catalog.s3` or `cluster`.
    pub kind: &'static str,
    /// The API collection path.
    pub family: ApiPath,
    /// Where the identifier lives.
    pub identity: Identity,
    /// The attribute table.
    pub schema: Schema,
    /// The tagged-union rule, for discriminated kinds.
    pub discriminator: Option<Discriminator>,
    /// Mutually exclusive attribute groups.
    pub exclusions: Vec<MutualExclusion>,
    /// Whether the kind can be adopted by identifier.
    pub importable: bool,
}

impl KindDefinition {
    /// Describe a kind.
    pub fn new(kind: &'static str, family: ApiPath, identity: Identity, schema: Schema) -> Self {
        Self {
            kind,
            family,
            identity,
            schema,
            discriminator: None,
            exclusions: Vec::new(),
            importable: true,
        }
    }

    /// Declare the kind as a tagged union.
    pub fn with_discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// Declare a mutual-exclusion rule.
    pub fn with_exclusion(mut self, exclusion: MutualExclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    /// Disallow import by identifier.
    pub fn not_importable(mut self) -> Self {
        self.importable = false;
        self
    }

    /// The host-facing type name under `prefix`.
    pub fn type_name(&self, prefix: &str) -> String {
        type_name(prefix, self.kind)
    }
}

/// Compose a host-facing type name: `prefix` + `_` + kind, dots becoming underscores.
pub fn type_name(prefix: &str, kind: &str) -> String {
    format!("{}_{}", prefix, kind.replace('.', "_"))
}

/// A type of Platform object the provider manages.
///
/// Implementors supply a [`KindDefinition`] and override the hooks their
/// business rules need. Every hook must be deterministic and free of I/O.
pub trait ResourceKind: Send + Sync {
    /// The static description of the kind.
    fn definition(&self) -> &KindDefinition;

    /// Cross-field checks run before any network call.
    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        let _ = (plan, diags);
    }

    /// Kind-specific plan rewrites. Must be idempotent.
    fn modify_plan(&self, plan: &mut Record, diags: &mut Diagnostics) {
        let _ = (plan, diags);
    }

    /// Final adjustments to a built request body.
    fn customize_request(&self, plan: &Record, body: &mut Map<String, Value>, op: Operation) {
        let _ = (plan, body, op);
    }

    /// Kind-specific projection rules, applied after the generic projector.
    fn after_projection(&self, record: &mut Record, response: &Map<String, Value>) {
        let _ = (record, response);
    }
}
