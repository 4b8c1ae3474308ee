//! Galaxy Provider
//!
//! A declarative resource provider for the Galaxy data-platform control
//! plane. The host describes desired infrastructure (catalogs, clusters,
//! roles, policies, data products and more) and this crate turns plans into
//! calls against the Platform REST API.
//!
//! # Overview
//!
//! Every attribute is tri-state: known, null, or unknown until apply. The
//! crate is built around a small reconciliation engine:
//!
//! - **Request Builder** ([`builder`]): turns a planned record into an API body,
//!   sending only known values
//! - **Response Projector** ([`projector`]): folds an API response back into
//!   state without disturbing configured values the server omits
//! - **Plan Modifier** ([`plan`]): variant pruning, mutual exclusions,
//!   defaults, and per-kind rules
//! - **CRUD Controller** ([`controller`]): the create/read/update/delete/import
//!   state machine, including tombstoning of vanished objects
//! - **Listing** ([`datasources`]): collection reads with pagination
//!
//! Resource kinds live in [`resources`]; each one is a [`KindDefinition`]
//! plus optional hooks on [`ResourceKind`].
//!
//! # Quick Start
//!
//! ```ignore
//! use galaxy_provider::{init_logging, GalaxyProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = GalaxyProvider::new();
//!     provider
//!         .configure(json!({
//!             "domain": "acme.galaxy.starburst.io",
//!             "client_id": "...",
//!             "client_secret": "...",
//!         }))
//!         .await?;
//!
//!     let plan = provider
//!         .plan("galaxy_cluster", None, json!({
//!             "name": "analytics",
//!             "cloud_region_id": "aws-us-east1",
//!             "min_workers": 1,
//!             "max_workers": 4,
//!         }))
//!         .await?;
//!     let state = provider.create("galaxy_cluster", plan.planned_state).await?;
//!     tracing::info!(?state, "cluster created");
//!     Ok(())
//! }
//! ```
//!
//! # Host Protocol
//!
//! [`ProviderService`] mirrors the host's operations:
//!
//! - **GetMetadata** / **GetSchema**: resource and data source type names and schemas
//! - **ValidateProviderConfig** / **Configure**: credentials and endpoint
//! - **Stop**: cancels in-flight operations
//! - **ValidateResourceConfig**, **UpgradeResourceState**, **Plan**
//! - **Create/Read/Update/Delete** and **ImportResourceState**
//! - **ValidateDataSourceConfig** / **ReadDataSource**
//!
//! Unknown values cross the boundary as [`value::UNKNOWN_SENTINEL`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod controller;
pub mod datasources;
pub mod diagnostics;
pub mod discriminator;
pub mod error;
pub mod kind;
pub mod logging;
pub mod plan;
pub mod projector;
pub mod provider;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod service;
pub mod testing;
pub mod transport;
pub mod types;
pub mod validation;
pub mod value;

// Re-export main types at crate root
pub use config::ProviderConfig;
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use error::ProviderError;
pub use kind::{KindDefinition, ResourceKind};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::GalaxyProvider;
pub use record::Record;
pub use registry::Registry;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use transport::{HttpTransport, Transport};
pub use types::{AttributeChange, ImportedResource, OperationResult, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};
pub use value::{Attr, AttrValue};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
