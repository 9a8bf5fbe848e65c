//! In-memory transport for unit tests.

use crate::client::DwApiClient;
use crate::config::ClientOptions;
use crate::error::{DwApiError, Result};
use crate::transport::Transport;
use std::cell::RefCell;
use std::collections::VecDeque;
use url::Url;

/// Replays queued responses and records every body it is asked to send.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<String>>>,
    sent: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn push_body(&self, body: &str) {
        self.responses.borrow_mut().push_back(Ok(body.to_string()));
    }

    pub(crate) fn push_error(&self, err: DwApiError) {
        self.responses.borrow_mut().push_back(Err(err));
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn post_json(&self, _endpoint: &Url, body: &str) -> Result<String> {
        self.sent.borrow_mut().push(body.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(DwApiError::transport("no scripted response")))
    }
}

pub(crate) fn client(options: ClientOptions) -> DwApiClient<ScriptedTransport> {
    DwApiClient::with_transport(options, ScriptedTransport::default())
}

/// Client with endpoint, application token and session already set.
pub(crate) fn authed_client() -> DwApiClient<ScriptedTransport> {
    client(
        ClientOptions::new("http://dw.test/api")
            .with_application_token("app-token")
            .with_organization_token("org-token")
            .with_session_id("session-1"),
    )
}
