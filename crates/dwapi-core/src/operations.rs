//! Typed wrappers for the API's commands.
//!
//! Each operation assembles a fixed parameter shape and delegates to
//! [`DwApiClient::send`]. User-operation inputs and remote-trigger
//! notification variables are sent as ordered `[{key, value}, ...]` lists.

use crate::client::DwApiClient;
use crate::error::{DwApiError, Result};
use crate::protocol::{commands, key_value_list, AttributeType, Params};
use crate::transport::Transport;
use serde_json::Value;
use std::fmt;
use tracing::info;

/// How the organization is identified when authenticating.
#[derive(Clone, PartialEq, Eq)]
pub enum OrgCredential {
    /// An organization token.
    Token(String),
    /// User login; sent as `username`/`password` instead of a token.
    Login { username: String, password: String },
}

impl OrgCredential {
    pub fn token(token: impl Into<String>) -> Self {
        OrgCredential::Token(token.into())
    }

    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        OrgCredential::Login {
            username: username.into(),
            password: password.into(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            OrgCredential::Token(token) => token.is_empty(),
            OrgCredential::Login { username, password } => {
                username.is_empty() && password.is_empty()
            }
        }
    }
}

impl fmt::Debug for OrgCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgCredential::Token(_) => f.write_str("Token(<redacted>)"),
            OrgCredential::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

fn cloudlink_params(cloudlink_id: &str) -> Params {
    let mut params = Params::new();
    params.insert("cloudlinkId".into(), Value::from(cloudlink_id));
    params
}

impl<T: Transport> DwApiClient<T> {
    /// Check the endpoint is reachable and answering.
    pub fn ping(&mut self) -> Result<bool> {
        self.execute(commands::PING, Params::new())
    }

    /// Authenticate the application and organization, returning a session ID.
    ///
    /// Explicit arguments override the client's configured tokens; empty
    /// values count as absent. The session ID is not stored; see
    /// [`login`](Self::login) for that.
    pub fn authenticate(
        &mut self,
        application_token: Option<&str>,
        credential: Option<OrgCredential>,
    ) -> Result<String> {
        let application_token = application_token
            .filter(|t| !t.is_empty())
            .unwrap_or(self.application_token.as_str())
            .to_string();
        let credential = credential
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| OrgCredential::Token(self.organization_token.clone()));

        if application_token.is_empty() {
            return Err(DwApiError::config("No applicationToken has been given."));
        }

        if credential.is_empty() {
            return Err(DwApiError::config(
                "No organizationToken, username or password have been given.",
            ));
        }

        let mut params = Params::new();
        params.insert("applicationToken".into(), Value::String(application_token));
        match credential {
            OrgCredential::Login { username, password } => {
                params.insert("username".into(), Value::String(username));
                params.insert("password".into(), Value::String(password));
            }
            OrgCredential::Token(token) => {
                params.insert("organizationToken".into(), Value::String(token));
            }
        }

        // sessionId comes back in params, so take the result-returning path.
        let response = self.call(commands::AUTHENTICATE, params)?;
        match response.get("sessionId").and_then(Value::as_str) {
            Some(session_id) => Ok(session_id.to_string()),
            None => Err(DwApiError::transport(
                "malformed response body: authenticate returned no sessionId",
            )),
        }
    }

    /// Authenticate and keep the returned session ID for later calls.
    pub fn login(
        &mut self,
        application_token: Option<&str>,
        credential: Option<OrgCredential>,
    ) -> Result<String> {
        let session_id = self.authenticate(application_token, credential)?;
        if let Some(token) = application_token.filter(|t| !t.is_empty()) {
            self.set_application_token(token);
        }
        self.set_session_id(session_id.clone());
        info!("Authenticated against {}", self.endpoint());
        Ok(session_id)
    }

    /// List all organizations available to the user.
    pub fn list_organizations(&mut self) -> Result<Params> {
        self.call(commands::ORG_LIST, Params::new())
    }

    /// Set the active organization.
    pub fn set_organization(&mut self, org_id: &str) -> Result<Params> {
        let mut params = Params::new();
        params.insert("id".into(), Value::from(org_id));
        self.call(commands::ORG_SET, params)
    }

    pub fn list_gateways(&mut self) -> Result<Params> {
        self.call(commands::GATEWAY_LIST, Params::new())
    }

    pub fn gateway_details(&mut self, cloudlink_id: &str) -> Result<Params> {
        self.call(commands::GATEWAY_DETAILS, cloudlink_params(cloudlink_id))
    }

    /// List user, system or both kinds of attributes of a gateway.
    pub fn list_attributes(
        &mut self,
        cloudlink_id: &str,
        attribute_type: AttributeType,
    ) -> Result<Params> {
        let mut params = cloudlink_params(cloudlink_id);
        params.insert("type".into(), Value::from(attribute_type.as_str()));
        self.call(commands::ATTRIBUTE_LIST, params)
    }

    pub fn list_user_ops(&mut self, cloudlink_id: &str) -> Result<Params> {
        self.call(commands::USEROP_LIST, cloudlink_params(cloudlink_id))
    }

    /// Execute a user operation on a gateway.
    ///
    /// `inputs` are the operation's arguments in order; pass `Params::new()`
    /// for none.
    pub fn exec_user_op<I, K, V>(
        &mut self,
        cloudlink_id: &str,
        operation: &str,
        inputs: I,
    ) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut params = cloudlink_params(cloudlink_id);
        params.insert("operation".into(), Value::from(operation));
        params.insert("inputs".into(), key_value_list(inputs));
        self.execute(commands::USEROP_EXEC, params)
    }

    pub fn list_remote_triggers(&mut self, cloudlink_id: &str) -> Result<Params> {
        self.call(commands::REMTRIGGER_LIST, cloudlink_params(cloudlink_id))
    }

    /// Fire a remote trigger with its notification variables.
    pub fn exec_remote_trigger<I, K, V>(
        &mut self,
        cloudlink_id: &str,
        identifier: &str,
        variables: I,
    ) -> Result<Params>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut params = cloudlink_params(cloudlink_id);
        params.insert("identifier".into(), Value::from(identifier));
        params.insert("notificationItems".into(), key_value_list(variables));
        self.call(commands::REMTRIGGER_EXEC, params)
    }
}
