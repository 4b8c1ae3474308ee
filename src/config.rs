//! Provider configuration.
//!
//! Settings arrive in the host's configure payload. Credentials left out
//! of the payload fall back to environment variables.

use serde::Deserialize;

use crate::diagnostics::Diagnostic;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Environment variable holding the tenant domain.
pub const ENV_DOMAIN: &str = "GALAXY_DOMAIN";
/// Environment variable holding the OAuth client id.
pub const ENV_CLIENT_ID: &str = "GALAXY_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "GALAXY_CLIENT_SECRET";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PAGE_SIZE: u32 = 100;

/// Resolved provider settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL of the tenant, with scheme and without a trailing slash.
    pub domain: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout_secs: u64,
    /// Page size used when listing collections.
    pub page_size: u32,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// The configure payload as sent by the host.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    domain: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    request_timeout_secs: Option<u64>,
    page_size: Option<u32>,
}

impl ProviderConfig {
    /// The provider configuration schema.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Connection settings for the Galaxy control plane")
            .with_attribute(
                "domain",
                Attribute::optional_string()
                    .with_description(format!("Tenant domain. Falls back to {ENV_DOMAIN}.")),
            )
            .with_attribute(
                "client_id",
                Attribute::optional_string()
                    .with_description(format!("OAuth client id. Falls back to {ENV_CLIENT_ID}.")),
            )
            .with_attribute(
                "client_secret",
                Attribute::optional_string().sensitive().with_description(format!(
                    "OAuth client secret. Falls back to {ENV_CLIENT_SECRET}."
                )),
            )
            .with_attribute(
                "request_timeout_secs",
                Attribute::optional_int64().with_default(DEFAULT_TIMEOUT_SECS.into()),
            )
            .with_attribute(
                "page_size",
                Attribute::optional_int64().with_default(DEFAULT_PAGE_SIZE.into()),
            )
    }

    /// Resolve a configure payload against the process environment.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ProviderError> {
        Self::resolve(value, |name| std::env::var(name).ok())
    }

    /// Resolve a configure payload, reading fallbacks through `env`.
    pub fn resolve(
        value: &serde_json::Value,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ProviderError> {
        let raw: RawConfig = if value.is_null() {
            RawConfig::default()
        } else {
            serde_json::from_value(value.clone())?
        };

        let pick = |given: Option<String>, var: &str| {
            given
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(var).filter(|v| !v.trim().is_empty()))
        };

        let domain = pick(raw.domain, ENV_DOMAIN);
        let client_id = pick(raw.client_id, ENV_CLIENT_ID);
        let client_secret = pick(raw.client_secret, ENV_CLIENT_SECRET);
        let missing: Vec<&str> = [
            ("domain", domain.is_none()),
            ("client_id", client_id.is_none()),
            ("client_secret", client_secret.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| name)
        .collect();
        let (Some(domain), Some(client_id), Some(client_secret)) = (domain, client_id, client_secret)
        else {
            return Err(ProviderError::Configuration(format!(
                "missing provider settings: {}",
                missing.join(", ")
            )));
        };

        let page_size = raw.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ProviderError::Configuration(
                "page_size must be greater than zero".into(),
            ));
        }

        Ok(Self {
            domain: normalize_domain(&domain),
            client_id,
            client_secret,
            request_timeout_secs: raw.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            page_size,
        })
    }

    /// Check a configure payload without keeping the result.
    pub fn validate(value: &serde_json::Value) -> Vec<Diagnostic> {
        match Self::from_value(value) {
            Ok(_) => Vec::new(),
            Err(err) => vec![Diagnostic::from_error(&err)],
        }
    }
}

/// Prepend `https://` to a bare domain and trim trailing slashes.
fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_from_payload() {
        let config = ProviderConfig::resolve(
            &json!({
                "domain": "acme.galaxy.starburst.io/",
                "client_id": "id",
                "client_secret": "secret",
            }),
            no_env,
        )
        .unwrap();

        assert_eq!(config.domain, "https://acme.galaxy.starburst.io");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_env_fallback() {
        let env = |name: &str| match name {
            ENV_DOMAIN => Some("http://localhost:8080".to_string()),
            ENV_CLIENT_ID => Some("env-id".to_string()),
            ENV_CLIENT_SECRET => Some("env-secret".to_string()),
            _ => None,
        };
        let config = ProviderConfig::resolve(&json!({"client_id": "given"}), env).unwrap();
        assert_eq!(config.domain, "http://localhost:8080");
        assert_eq!(config.client_id, "given");
        assert_eq!(config.client_secret, "env-secret");
    }

    #[test]
    fn test_missing_settings() {
        let err = ProviderConfig::resolve(&json!({"domain": "d"}), no_env).unwrap_err();
        assert!(err.message().contains("client_id, client_secret"));

        let err = ProviderConfig::resolve(&serde_json::Value::Null, no_env).unwrap_err();
        assert!(err.message().contains("domain"));
    }

    #[test]
    fn test_empty_values_are_rejected() {
        let err = ProviderConfig::resolve(
            &json!({"domain": "d", "client_id": " ", "client_secret": "s"}),
            no_env,
        )
        .unwrap_err();
        assert!(err.message().contains("client_id"));
    }

    #[test]
    fn test_zero_page_size() {
        let err = ProviderConfig::resolve(
            &json!({"domain": "d", "client_id": "i", "client_secret": "s", "page_size": 0}),
            no_env,
        )
        .unwrap_err();
        assert!(err.message().contains("page_size"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ProviderConfig::resolve(
            &json!({"domain": "d", "client_id": "i", "client_secret": "hunter2"}),
            no_env,
        )
        .unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_schema_marks_secret_sensitive() {
        let schema = ProviderConfig::schema();
        assert!(schema.block.attribute("client_secret").unwrap().flags.sensitive);
    }
}
