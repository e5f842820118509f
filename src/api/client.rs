//! Jolpica / Ergast API client
//!
//! GET requests with a timeout and bounded retries on retryable status codes.
//! `get_url` and `fetch_envelope` never fail: on timeouts, connection errors,
//! exhausted retries or malformed bodies they log a warning and hand back an
//! empty-but-valid payload, which is how callers detect a degraded API.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::transport::{ReqwestTransport, Transport, TransportError};
use crate::config::ApiConfig;
use crate::data::Envelope;

/// Errors that can occur when fetching from the API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Timeout, connection failure or similar
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Body was not the expected JSON
    #[error("Failed to parse JSON response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Payload returned in place of real data when the API is degraded
pub fn sentinel_payload() -> Value {
    json!({"MRData": {"total": 0}})
}

/// Client for the F1 statistics API
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    retries: u32,
    retry_statuses: Vec<u16>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("retry_statuses", &self.retry_statuses)
            .finish()
    }
}

impl ApiClient {
    /// Create a client over the real network using the given settings
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Create a client over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: &ApiConfig) -> Self {
        Self {
            transport,
            timeout: config.timeout(),
            retries: config.retries,
            retry_statuses: config.retry_statuses.clone(),
        }
    }

    /// Same client with a different per-request timeout
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Whether `err` may clear up if the request is repeated
    ///
    /// Transport failures and the configured retry statuses qualify. Other
    /// statuses and malformed bodies fail the same way every time.
    pub fn is_retryable(&self, err: &ApiError) -> bool {
        match err {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => self.retry_statuses.contains(status),
            ApiError::Parse { .. } => false,
        }
    }

    /// GET `url` and decode JSON, propagating failures
    ///
    /// Responses with a retryable status are retried immediately, up to the
    /// configured number of extra attempts.
    pub async fn try_get(&self, url: &str) -> Result<Value, ApiError> {
        let mut attempt = 0;
        loop {
            let response = self.transport.get(url, self.timeout).await?;

            if !response.is_success() {
                if self.retry_statuses.contains(&response.status) && attempt < self.retries {
                    attempt += 1;
                    tracing::debug!(url, status = response.status, attempt, "retrying request");
                    continue;
                }
                return Err(ApiError::Status {
                    status: response.status,
                    url: url.to_string(),
                });
            }

            return serde_json::from_str(&response.body).map_err(|source| ApiError::Parse {
                url: url.to_string(),
                source,
            });
        }
    }

    /// GET `url` as a typed envelope, propagating failures
    pub async fn try_fetch(&self, url: &str) -> Result<Envelope, ApiError> {
        let value = self.try_get(url).await?;
        Envelope::from_value(value).map_err(|source| ApiError::Parse {
            url: url.to_string(),
            source,
        })
    }

    /// GET `url`, degrading to [`sentinel_payload`] on any failure
    pub async fn get_url(&self, url: &str) -> Value {
        match self.try_get(url).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(url, error = %err, "API request failed, using empty payload");
                sentinel_payload()
            }
        }
    }

    /// GET `url` as a typed envelope, degrading to an empty one on any failure
    pub async fn fetch_envelope(&self, url: &str) -> Envelope {
        match self.try_fetch(url).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(url, error = %err, "API request failed, using empty payload");
                Envelope::default()
            }
        }
    }
}
