//! Platform API transport.
//!
//! The reconciliation engine talks to the Platform API only through the
//! [`Transport`] trait. [`HttpTransport`] is the production implementation;
//! tests substitute an in-memory one.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::ProviderError;

/// A JSON object as sent to or returned by the API.
pub type JsonObject = Map<String, Value>;

/// The collection path of one resource family, relative to the API root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath(String);

impl ApiPath {
    /// A collection at `path`, e.g. `/cluster`.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The collection of catalogs of one type, e.g. `/catalogType/s3/catalog`.
    pub fn catalog(family: &str) -> Self {
        Self(format!("/catalogType/{family}/catalog"))
    }

    /// The collection path.
    pub fn collection(&self) -> &str {
        &self.0
    }

    /// The path of one item in the collection.
    pub fn item(&self, id: &str) -> String {
        format!("{}/{}", self.0, id)
    }
}

impl std::fmt::Display for ApiPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated access to the Platform API.
///
/// Every method maps transport failures onto [`ProviderError`], with
/// `404` becoming [`ProviderError::NotFound`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch one item.
    async fn get(&self, path: &ApiPath, id: &str) -> Result<JsonObject, ProviderError>;

    /// Create an item; returns the server's representation.
    async fn create(&self, path: &ApiPath, body: JsonObject) -> Result<JsonObject, ProviderError>;

    /// Patch an item; returns the server's representation.
    async fn update(
        &self,
        path: &ApiPath,
        id: &str,
        body: JsonObject,
    ) -> Result<JsonObject, ProviderError>;

    /// Delete an item.
    async fn delete(&self, path: &ApiPath, id: &str) -> Result<(), ProviderError>;

    /// Fetch every element of a paginated collection.
    ///
    /// `path` may carry a query string.
    async fn list_all(&self, path: &str) -> Result<Vec<Value>, ProviderError>;

    /// Fetch an arbitrary object, e.g. a status sub-resource.
    async fn get_object(&self, path: &str) -> Result<JsonObject, ProviderError>;

    /// Invoke an action endpoint.
    async fn post_action(&self, path: &str, body: JsonObject) -> Result<JsonObject, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_path() {
        let path = ApiPath::catalog("s3");
        assert_eq!(path.collection(), "/catalogType/s3/catalog");
        assert_eq!(path.item("c-1"), "/catalogType/s3/catalog/c-1");
    }

    #[test]
    fn test_display() {
        assert_eq!(ApiPath::new("/cluster").to_string(), "/cluster");
    }
}
