//! Error types for the DeviceWISE API client.
//!
//! Every failed call surfaces one of three kinds: a configuration problem
//! detected before anything is sent, a transport problem talking to the
//! endpoint, or an error message returned by the API itself.

use thiserror::Error;

/// Main error type for the dwapi crate.
#[derive(Debug, Error)]
pub enum DwApiError {
    /// A required credential, endpoint or command was missing before the call.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The request could not be delivered or the response could not be read.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status code when the endpoint answered with a non-2xx status.
        status: Option<u16>,
        #[source]
        source: Option<TransportCause>,
    },

    /// The endpoint answered with a non-empty `errorMessage`.
    #[error("API error: {message}")]
    Api { message: String },
}

/// Underlying error behind a [`DwApiError::Transport`].
#[derive(Debug, Error)]
pub enum TransportCause {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for dwapi operations.
pub type Result<T> = std::result::Result<T, DwApiError>;

impl From<reqwest::Error> for DwApiError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        DwApiError::Transport {
            message,
            status: err.status().map(|s| s.as_u16()),
            source: Some(TransportCause::Http(err)),
        }
    }
}

impl From<serde_json::Error> for DwApiError {
    fn from(err: serde_json::Error) -> Self {
        DwApiError::Transport {
            message: format!("malformed response body: {}", err),
            status: None,
            source: Some(TransportCause::Json(err)),
        }
    }
}

impl DwApiError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        DwApiError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        DwApiError::Transport {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// True if the call was rejected before anything was sent.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DwApiError::Configuration { .. })
    }

    /// True for connection, status, and malformed-body failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, DwApiError::Transport { .. })
    }

    /// The verbatim `errorMessage` returned by the API, if this is an API error.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            DwApiError::Api { message } => Some(message),
            _ => None,
        }
    }
}
