//! Backend REST API client used by refresh triggers

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::SourceError;

/// Default appliance API root
pub const DEFAULT_BASE_URL: &str = "https://localhost/api";

/// Outbound calls to the appliance backend API
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// POST with an empty body to `path` under the API root.
    ///
    /// Returns the HTTP status on success; non-2xx statuses are errors.
    async fn post(&self, path: &str) -> Result<u16, SourceError>;
}

/// Settings for [`RestClient`]
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// API root, e.g. `https://localhost/api`
    pub base_url: String,
    /// Verify the server certificate (off for a self-signed local appliance)
    pub verify_tls: bool,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_tls: false,
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// [`BackendApi`] over HTTP
pub struct RestClient {
    base_url: Url,
    token: Option<String>,
    http_client: reqwest::Client,
}

impl RestClient {
    pub fn new(config: RestClientConfig) -> Result<Self, SourceError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| SourceError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .build()
            .map_err(|source| SourceError::Api {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            base_url,
            token: config.token,
            http_client,
        })
    }

    /// Full URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl BackendApi for RestClient {
    async fn post(&self, path: &str) -> Result<u16, SourceError> {
        let url = self.endpoint(path);

        let mut request = self.http_client.post(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| SourceError::Api {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Backend call returned");
        if !status.is_success() {
            return Err(SourceError::ApiStatus {
                url,
                status: status.as_u16(),
            });
        }

        Ok(status.as_u16())
    }
}
