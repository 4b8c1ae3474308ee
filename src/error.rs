//! Error types for the Galaxy provider.

use thiserror::Error;

/// Errors that can occur while reconciling Galaxy resources.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested remote object was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal engine error occurred (an invariant was violated).
    #[error("SDK error: {0}")]
    Sdk(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An HTTP transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Resource already exists (create conflict).
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Permission denied (authentication/authorization failure).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Quota or rate limit exceeded.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Service temporarily unavailable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Operation timed out.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Operation failed due to current state (precondition not met).
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// The Platform API rejected the request as malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The Platform API returned an unclassified error status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message or raw body.
        message: String,
    },

    /// The operation was cancelled by the host.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// An error annotated with the resource kind and identity it concerns.
    #[error("{kind}{}: {source}", fmt_id(.id))]
    Resource {
        /// The resource kind, e.g. `catalog.s3`.
        kind: String,
        /// The identity of the record, if known.
        id: Option<String>,
        /// The underlying error.
        #[source]
        source: Box<ProviderError>,
    },
}

fn fmt_id(id: &Option<String>) -> String {
    id.as_deref().map(|id| format!(" {id}")).unwrap_or_default()
}

impl ProviderError {
    /// Get the error message as a string.
    ///
    /// Returns a reference to the error message for any variant.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Sdk(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Transport(_err) => "transport error (see Debug output)",
            Self::AlreadyExists(msg) => msg,
            Self::PermissionDenied(msg) => msg,
            Self::ResourceExhausted(msg) => msg,
            Self::Unavailable(msg) => msg,
            Self::DeadlineExceeded(msg) => msg,
            Self::FailedPrecondition(msg) => msg,
            Self::Unimplemented(msg) => msg,
            Self::InvalidRequest(msg) => msg,
            Self::Api { message, .. } => message,
            Self::Cancelled(msg) => msg,
            Self::Resource { source, .. } => source.message(),
        }
    }

    /// Whether the Platform API reported the object as absent.
    ///
    /// Looks through [`ProviderError::Resource`] annotations.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { status, .. } => *status == 404,
            Self::Resource { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Whether the error came from an observed cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled(_) => true,
            Self::Resource { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Annotate this error with a resource kind and optional identity.
    ///
    /// Errors that already carry an annotation are returned unchanged.
    pub fn for_resource(self, kind: impl Into<String>, id: Option<&str>) -> Self {
        match self {
            Self::Resource { .. } => self,
            other => Self::Resource {
                kind: kind.into(),
                id: id.map(str::to_string),
                source: Box::new(other),
            },
        }
    }

    /// The short, single-line summary used for host diagnostics.
    pub fn summary(&self) -> String {
        match self {
            Self::Resource { kind, id, source } => match id {
                Some(id) => format!("{} failed for {} {}", source.category(), kind, id),
                None => format!("{} failed for {}", source.category(), kind),
            },
            other => format!("{} failed", other.category()),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Lookup",
            Self::Validation(_) | Self::Configuration(_) | Self::InvalidRequest(_) => {
                "Configuration"
            },
            Self::Sdk(_) => "Reconciliation",
            Self::UnknownResource(_) | Self::Unimplemented(_) => "Dispatch",
            Self::Serialization(_) => "Decoding",
            Self::Cancelled(_) => "Cancelled operation",
            Self::Resource { source, .. } => source.category(),
            _ => "Platform API request",
        }
    }
}
