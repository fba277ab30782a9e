//! REST client for the upstream video-generation provider.
//!
//! Wraps the provider's job endpoints (submit, fetch, cancel) using
//! [`reqwest`]. Responses are not interpreted: status and body are handed
//! back as-is so the caller can relay them.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use vidrelay_core::job::GenerationOptions;

/// Connection settings for the upstream provider.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the provider API, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Bearer credential. Every call fails with
    /// [`UpstreamError::MissingCredential`] while this is unset.
    pub api_key: Option<String>,
    /// Upper bound on a single upstream request, connect through body.
    pub timeout: Duration,
}

/// A provider response, relayed without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    /// The provider answered with a JSON body.
    Json {
        status: StatusCode,
        body: serde_json::Value,
    },
    /// The provider answered with no body (typically `204 No Content`).
    NoContent { status: StatusCode },
    /// A non-success reply whose body is not JSON (plain-text or HTML error
    /// pages). Relayed byte for byte with its content type.
    Raw {
        status: StatusCode,
        content_type: Option<String>,
        body: Vec<u8>,
    },
}

impl UpstreamReply {
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamReply::Json { status, .. }
            | UpstreamReply::NoContent { status }
            | UpstreamReply::Raw { status, .. } => *status,
        }
    }
}

/// Errors raised while building an [`UpstreamClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// The configured base URL cannot carry request paths.
    #[error("Invalid upstream base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors from the upstream REST layer.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// No API key configured; raised before any network call.
    #[error("Upstream API key is not configured")]
    MissingCredential,

    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider reported success with a body that is not JSON.
    #[error("Upstream returned a non-JSON body ({status}): {source}")]
    InvalidBody {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

/// HTTP client for the upstream provider.
#[derive(Debug)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl UpstreamClient {
    /// Build a client with its own connection pool and request timeout.
    pub fn new(config: UpstreamConfig) -> Result<Self, ClientBuildError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Self::with_client(client, config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    ///
    /// The timeout in `config` is ignored; the given client's settings apply.
    pub fn with_client(
        client: reqwest::Client,
        config: UpstreamConfig,
    ) -> Result<Self, ClientBuildError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientBuildError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientBuildError::InvalidBaseUrl(config.base_url));
        }

        let api_key = config.api_key.filter(|key| !key.trim().is_empty());

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Submit a generation job.
    ///
    /// Sends `POST {base}/videos` with the options as the JSON body.
    pub async fn create_video(
        &self,
        options: &GenerationOptions,
    ) -> Result<UpstreamReply, UpstreamError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(self.endpoint(&["videos"]))
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .json(options)
            .send()
            .await?;

        Self::relay(response).await
    }

    /// Fetch a job's current state.
    ///
    /// Sends `GET {base}/videos/{id}`.
    pub async fn get_video(&self, id: &str) -> Result<UpstreamReply, UpstreamError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.endpoint(&["videos", id]))
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        Self::relay(response).await
    }

    /// Ask the provider to cancel a job.
    ///
    /// Sends `POST {base}/videos/{id}/cancel`.
    pub async fn cancel_video(&self, id: &str) -> Result<UpstreamReply, UpstreamError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(self.endpoint(&["videos", id, "cancel"]))
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        Self::relay(response).await
    }

    // ---- private helpers ----

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.api_key.as_deref().ok_or(UpstreamError::MissingCredential)
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `with_client` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Read the response into an [`UpstreamReply`] regardless of status.
    ///
    /// Only a success status with an unreadable body is an error; error
    /// statuses are relayed even when their body is not JSON.
    async fn relay(response: reqwest::Response) -> Result<UpstreamReply, UpstreamError> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(UpstreamReply::NoContent { status });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(UpstreamReply::NoContent { status });
        }

        tracing::debug!(status = status.as_u16(), "Upstream responded");

        match serde_json::from_slice(&bytes) {
            Ok(body) => Ok(UpstreamReply::Json { status, body }),
            Err(_) if !status.is_success() => Ok(UpstreamReply::Raw {
                status,
                content_type,
                body: bytes.to_vec(),
            }),
            Err(source) => Err(UpstreamError::InvalidBody { status, source }),
        }
    }
}
