//! Transport capability and its reqwest-backed implementation.

use crate::{HttpConfig, RequestDescriptor, RequestPayload};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A transport-level failure: the request never completed with a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// Raw response of the webservice, prior to any interpretation.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Capability to issue an HTTP-like request and receive a structured response.
///
/// The proxy is generic over this seam so tests can substitute an in-memory
/// implementation.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// Transport over a reqwest client with the configured timeout and
/// optional basic-auth credentials.
pub struct HttpTransport {
    client: Client,
    auth: Option<(String, String)>,
}

impl HttpTransport {
    /// Create a new HTTP transport from the given configuration.
    pub fn new(config: &HttpConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        let auth = match (&config.username, &config.password) {
            (Some(username), Some(password)) if !username.is_empty() => {
                Some((username.clone(), password.clone()))
            }
            _ => None,
        };

        Self { client, auth }
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);

        if let Some((username, password)) = &self.auth {
            builder = builder.basic_auth(username, Some(password));
        }

        builder = match &request.payload {
            RequestPayload::None => builder,
            RequestPayload::Json(body) => builder.json(body),
            RequestPayload::EncodedFilters(filters) => builder.json(filters),
        };

        debug!(method = %request.method, url = %request.url, "Sending request");

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
