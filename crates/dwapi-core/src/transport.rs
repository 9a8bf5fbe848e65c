//! HTTP transport for API envelopes.
//!
//! [`Transport`] is the seam between envelope handling and the network:
//! it POSTs an already-serialized JSON body and hands back the raw response
//! body. [`HttpTransport`] is the blocking reqwest implementation used by
//! default.

use crate::config::NetworkConfig;
use crate::error::{DwApiError, Result, TransportCause};
use reqwest::blocking::Client;
use reqwest::header;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Delivers one serialized request body and returns the raw response body.
///
/// Implementations must report connection failures, non-2xx statuses and
/// empty bodies as [`DwApiError::Transport`].
pub trait Transport {
    fn post_json(&self, endpoint: &Url, body: &str) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_json(&self, endpoint: &Url, body: &str) -> Result<String> {
        (**self).post_json(endpoint, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn post_json(&self, endpoint: &Url, body: &str) -> Result<String> {
        (**self).post_json(endpoint, body)
    }
}

/// Blocking HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the default request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom request timeout.
    ///
    /// A zero timeout would fail every request, so it falls back to the
    /// default.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let timeout = if timeout.is_zero() {
            NetworkConfig::REQUEST_TIMEOUT
        } else {
            timeout
        };
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| DwApiError::Transport {
                message: format!("Failed to create HTTP client: {}", e),
                status: None,
                source: Some(TransportCause::Http(e)),
            })?;

        Ok(Self { client, timeout })
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, endpoint: &Url, body: &str) -> Result<String> {
        let response = self
            .client
            .post(endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .map_err(|e| {
                warn!("POST to {} failed: {}", endpoint_host(endpoint), e);
                DwApiError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "POST to {} returned HTTP {}",
                endpoint_host(endpoint),
                status.as_u16()
            );
            return Err(DwApiError::Transport {
                message: format!("Failed to POST to {}: HTTP {}", endpoint, status),
                status: Some(status.as_u16()),
                source: None,
            });
        }

        let text = response.text()?;
        if text.is_empty() {
            return Err(DwApiError::transport(format!(
                "Failed to POST to {}: empty response body",
                endpoint
            )));
        }

        debug!("Received {} bytes from {}", text.len(), endpoint_host(endpoint));
        Ok(text)
    }
}

/// Host part of an endpoint for log lines.
pub fn endpoint_host(endpoint: &Url) -> &str {
    endpoint.host_str().unwrap_or("unknown")
}
