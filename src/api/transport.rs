//! HTTP transport underneath the API and news clients
//!
//! The `Transport` trait is the seam between request logic (retries,
//! degradation, pagination) and the network, so that logic can be exercised
//! against scripted responses.

use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{redirect, Client};
use std::time::Duration;
use thiserror::Error;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures before any HTTP status was received
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Issues GET requests
pub trait Transport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

/// `Accept` value for the statistics API
pub const JSON_ACCEPT: &str = "application/json";

/// `Accept` value for news feeds
pub const RSS_ACCEPT: &str = "application/rss+xml, application/xml;q=0.9, */*;q=0.8";

fn default_headers(accept: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client that asks for JSON and follows redirects
    pub fn new() -> Result<Self, TransportError> {
        Self::with_accept(JSON_ACCEPT)
    }

    /// Builds a client that sends `accept` with every request
    pub fn with_accept(accept: &'static str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .default_headers(default_headers(accept))
            .redirect(redirect::Policy::limited(10))
            .user_agent(concat!("pitwall/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let response = self.client.get(url).timeout(timeout).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}
