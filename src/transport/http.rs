//! `reqwest`-backed transport for the Platform REST API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{ApiPath, JsonObject, Transport};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::record::value_type_name;

const API_PREFIX: &str = "/public/api/v1";
const TOKEN_PATH: &str = "/oauth/v2/token";
const REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Authenticated HTTP access to one tenant.
pub struct HttpTransport {
    client: Client,
    domain: String,
    client_id: String,
    client_secret: String,
    page_size: u32,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    300
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    #[serde(default)]
    result: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl HttpTransport {
    /// Build a transport from resolved settings.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            domain: config.domain.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            page_size: config.page_size,
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ProviderError> {
        Url::parse(&format!("{}{}{}", self.domain, API_PREFIX, path)).map_err(|e| {
            ProviderError::Configuration(format!("invalid API URL for {path}: {e}"))
        })
    }

    fn item_url(&self, path: &ApiPath, id: &str) -> Result<Url, ProviderError> {
        let mut url = self.url(path.collection())?;
        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::Configuration(format!("{} cannot be used as a base URL", self.domain))
            })?
            .push(id);
        Ok(url)
    }

    /// A valid access token, fetching a new one when the cached token is
    /// about to expire.
    async fn bearer(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!("requesting access token");
        let response = self
            .client
            .post(format!("{}{}", self.domain, TOKEN_PATH))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "token request rejected");
            return Err(classify(status, &body));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&JsonObject>,
    ) -> Result<JsonObject, ProviderError> {
        let token = self.bearer().await?;
        debug!(method = %method, url = %url, "platform API request");

        let mut request = self.client.request(method.clone(), url.clone()).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(method = %method, url = %url, status = status.as_u16(), "platform API response");

        if !status.is_success() {
            return Err(classify(status, &text));
        }
        decode_object(&text)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &ApiPath, id: &str) -> Result<JsonObject, ProviderError> {
        self.send(Method::GET, self.item_url(path, id)?, None).await
    }

    async fn create(&self, path: &ApiPath, body: JsonObject) -> Result<JsonObject, ProviderError> {
        self.send(Method::POST, self.url(path.collection())?, Some(&body))
            .await
    }

    async fn update(
        &self,
        path: &ApiPath,
        id: &str,
        body: JsonObject,
    ) -> Result<JsonObject, ProviderError> {
        self.send(Method::PATCH, self.item_url(path, id)?, Some(&body))
            .await
    }

    async fn delete(&self, path: &ApiPath, id: &str) -> Result<(), ProviderError> {
        self.send(Method::DELETE, self.item_url(path, id)?, None)
            .await
            .map(|_| ())
    }

    async fn list_all(&self, path: &str) -> Result<Vec<Value>, ProviderError> {
        let mut results = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.url(path)?;
            url.query_pairs_mut()
                .append_pair("pageSize", &self.page_size.to_string());
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: Page = serde_json::from_value(Value::Object(
                self.send(Method::GET, url, None).await?,
            ))?;
            results.extend(page.result);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        debug!(path, count = results.len(), "listed collection");
        Ok(results)
    }

    async fn get_object(&self, path: &str) -> Result<JsonObject, ProviderError> {
        self.send(Method::GET, self.url(path)?, None).await
    }

    async fn post_action(&self, path: &str, body: JsonObject) -> Result<JsonObject, ProviderError> {
        self.send(Method::POST, self.url(path)?, Some(&body)).await
    }
}

fn decode_object(body: &str) -> Result<JsonObject, ProviderError> {
    if body.trim().is_empty() {
        return Ok(JsonObject::new());
    }
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(ProviderError::Sdk(format!(
            "expected a JSON object from the API, got {}",
            value_type_name(&other)
        ))),
    }
}

/// Map a non-success status onto the error taxonomy.
fn classify(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.to_string()
            }
        });

    match status {
        StatusCode::NOT_FOUND => ProviderError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::PermissionDenied(message),
        StatusCode::CONFLICT => ProviderError::AlreadyExists(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::ResourceExhausted(message),
        StatusCode::SERVICE_UNAVAILABLE => ProviderError::Unavailable(message),
        StatusCode::GATEWAY_TIMEOUT => ProviderError::DeadlineExceeded(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::InvalidRequest(message)
        },
        other => ProviderError::Api {
            status: other.as_u16(),
            message,
        },
    }
}
