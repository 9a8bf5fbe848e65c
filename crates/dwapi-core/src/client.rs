//! The request/response primitive every API operation goes through.
//!
//! [`DwApiClient::send`] builds the envelope, attaches the auth block when the
//! command needs one, POSTs it through the configured [`Transport`] and
//! unwraps `data.params` or `data.errorMessage`.
//!
//! # Thread Safety
//!
//! The last request and response bodies are kept on the client for
//! debugging, so every sending method takes `&mut self`. Use one client per
//! thread when issuing requests in parallel.

use crate::config::{redact, ClientOptions};
use crate::error::{DwApiError, Result};
use crate::protocol::{
    requires_auth, AuthBlock, CommandData, Params, RequestEnvelope, ResponseEnvelope,
};
use crate::transport::{endpoint_host, HttpTransport, Transport};
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Outcome of a successful [`DwApiClient::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `data.params` of the response, returned when a result was requested.
    Params(Params),
    /// The call succeeded and the caller asked only for success.
    Success,
}

impl Reply {
    /// Response params, or an empty map for [`Reply::Success`].
    pub fn into_params(self) -> Params {
        match self {
            Reply::Params(params) => params,
            Reply::Success => Params::new(),
        }
    }
}

/// Client for the DeviceWISE public API.
pub struct DwApiClient<T: Transport = HttpTransport> {
    endpoint: String,
    pub(crate) application_token: String,
    pub(crate) organization_token: String,
    session_id: String,
    transport: T,
    last_sent: Option<String>,
    last_received: Option<String>,
}

impl DwApiClient<HttpTransport> {
    /// Create a client that talks HTTP with the options' timeout.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let transport = HttpTransport::with_timeout(options.timeout())?;
        Ok(Self::with_transport(options, transport))
    }
}

impl<T: Transport> DwApiClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(options: ClientOptions, transport: T) -> Self {
        Self {
            endpoint: options.endpoint,
            application_token: options.application_token,
            organization_token: options.organization_token,
            session_id: options.session_id,
            transport,
            last_sent: None,
            last_received: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    pub fn set_application_token(&mut self, token: impl Into<String>) {
        self.application_token = token.into();
    }

    pub fn set_organization_token(&mut self, token: impl Into<String>) {
        self.organization_token = token.into();
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.session_id = session_id.into();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// JSON body of the last request handed to the transport.
    pub fn last_sent(&self) -> Option<&str> {
        self.last_sent.as_deref()
    }

    /// Raw body of the last response received, if the last call got one.
    pub fn last_received(&self) -> Option<&str> {
        self.last_received.as_deref()
    }

    /// Send `command` with `params` and unwrap the response.
    ///
    /// With `want_result` the response's `data.params` are returned as
    /// [`Reply::Params`]; otherwise a successful call yields
    /// [`Reply::Success`]. Missing credentials fail before anything is sent.
    pub fn send(&mut self, command: &str, params: Params, want_result: bool) -> Result<Reply> {
        if command.is_empty() {
            return Err(DwApiError::config("No command has been given."));
        }
        let endpoint = self.parse_endpoint()?;

        let body = {
            let envelope = RequestEnvelope {
                auth: self.auth_block(command)?,
                data: CommandData {
                    command,
                    params: &params,
                },
            };
            debug!(
                "Sending {} to {} (auth: {})",
                command,
                endpoint_host(&endpoint),
                envelope.auth.is_some()
            );
            serde_json::to_string(&envelope).map_err(|e| {
                DwApiError::config(format!("Failed to serialize {} params: {}", command, e))
            })?
        };

        self.last_received = None;
        let result = self.transport.post_json(&endpoint, &body);
        self.last_sent = Some(body);
        let raw = result?;
        self.last_received = Some(raw);

        self.unwrap_response(command, want_result)
    }

    /// Send `command` and return the response params.
    pub fn call(&mut self, command: &str, params: Params) -> Result<Params> {
        self.send(command, params, true).map(Reply::into_params)
    }

    /// Send `command` and return `true` on success.
    pub fn execute(&mut self, command: &str, params: Params) -> Result<bool> {
        self.send(command, params, false).map(|_| true)
    }

    fn parse_endpoint(&self) -> Result<Url> {
        if self.endpoint.is_empty() {
            return Err(DwApiError::config("No endpoint has been defined."));
        }
        Url::parse(&self.endpoint).map_err(|e| {
            DwApiError::config(format!("Invalid endpoint {:?}: {}", self.endpoint, e))
        })
    }

    fn auth_block(&self, command: &str) -> Result<Option<AuthBlock<'_>>> {
        if !requires_auth(command) {
            return Ok(None);
        }

        if self.application_token.is_empty() {
            return Err(DwApiError::config("No Application Token has been defined."));
        }

        if self.session_id.is_empty() {
            return Err(DwApiError::config("No session id has been defined."));
        }

        Ok(Some(AuthBlock {
            application_token: &self.application_token,
            session_id: &self.session_id,
        }))
    }

    fn unwrap_response(&self, command: &str, want_result: bool) -> Result<Reply> {
        let raw = self.last_received.as_deref().unwrap_or_default();
        let envelope: ResponseEnvelope = serde_json::from_str(raw)?;
        let data = envelope
            .data
            .ok_or_else(|| DwApiError::transport("malformed response body: missing data"))?;

        if let Some(message) = data.error() {
            warn!("{} failed: {}", command, message);
            return Err(DwApiError::Api {
                message: message.to_string(),
            });
        }

        match (data.into_params(), want_result) {
            (_, false) => Ok(Reply::Success),
            (Some(params), true) => Ok(Reply::Params(params)),
            (None, true) => Err(DwApiError::transport(format!(
                "malformed response body: {} params is not an object",
                command
            ))),
        }
    }
}

impl<T: Transport> fmt::Debug for DwApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DwApiClient")
            .field("endpoint", &self.endpoint)
            .field("application_token", &redact(&self.application_token))
            .field("organization_token", &redact(&self.organization_token))
            .field("session_id", &redact(&self.session_id))
            .finish_non_exhaustive()
    }
}
