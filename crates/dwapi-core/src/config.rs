//! Centralized configuration for the DeviceWISE API client.
//!
//! Holds network constants and the construction-time [`ClientOptions`]
//! (endpoint and credentials), which can be built in code, deserialized from
//! a JSON options object, or read from the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = concat!("dwapi/", env!("CARGO_PKG_VERSION"));
}

/// Environment variable names read by [`ClientOptions::from_env`].
pub struct EnvConfig;

impl EnvConfig {
    pub const ENDPOINT: &'static str = "DWAPI_ENDPOINT";
    pub const APPLICATION_TOKEN: &'static str = "DWAPI_APPLICATION_TOKEN";
    pub const ORGANIZATION_TOKEN: &'static str = "DWAPI_ORGANIZATION_TOKEN";
    pub const SESSION_ID: &'static str = "DWAPI_SESSION_ID";
    pub const TIMEOUT_MS: &'static str = "DWAPI_TIMEOUT_MS";
}

/// Construction-time options for a [`DwApiClient`](crate::DwApiClient).
///
/// Every field is optional; empty strings mean "not configured". Keys use
/// camelCase when (de)serialized, so an options object such as
/// `{"endpoint": "...", "applicationToken": "..."}` loads directly.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientOptions {
    /// The API endpoint to POST to (e.g. `https://www.example.com/api`).
    pub endpoint: String,
    pub application_token: String,
    pub organization_token: String,
    /// Session ID issued by `api.authenticate`.
    pub session_id: String,
    /// Per-request timeout in milliseconds. Unset or zero means
    /// [`NetworkConfig::REQUEST_TIMEOUT`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ClientOptions {
    /// Create options pointing at an endpoint with no credentials.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the application token.
    pub fn with_application_token(mut self, token: impl Into<String>) -> Self {
        self.application_token = token.into();
        self
    }

    /// Set the organization token.
    pub fn with_organization_token(mut self, token: impl Into<String>) -> Self {
        self.organization_token = token.into();
        self
    }

    /// Set an existing session ID.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Set the per-request timeout.
    ///
    /// A zero duration restores the default. Sub-millisecond timeouts round
    /// up to one millisecond.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = if timeout.is_zero() {
            None
        } else {
            Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1))
        };
        self
    }

    /// Effective per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Read options from `DWAPI_*` environment variables.
    ///
    /// Blank values are treated as unset. An unparsable or zero timeout is
    /// ignored and the default is used instead.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };

        let timeout_raw = read(EnvConfig::TIMEOUT_MS);
        let timeout_ms = if timeout_raw.is_empty() {
            None
        } else {
            match timeout_raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Some(ms),
                _ => {
                    tracing::warn!(
                        "Ignoring invalid {} value: {:?}",
                        EnvConfig::TIMEOUT_MS,
                        timeout_raw
                    );
                    None
                }
            }
        };

        Self {
            endpoint: read(EnvConfig::ENDPOINT),
            application_token: read(EnvConfig::APPLICATION_TOKEN),
            organization_token: read(EnvConfig::ORGANIZATION_TOKEN),
            session_id: read(EnvConfig::SESSION_ID),
            timeout_ms,
        }
    }
}

// Token values stay out of logs and panic messages.
impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("endpoint", &self.endpoint)
            .field("application_token", &redact(&self.application_token))
            .field("organization_token", &redact(&self.organization_token))
            .field("session_id", &redact(&self.session_id))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

pub(crate) fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
