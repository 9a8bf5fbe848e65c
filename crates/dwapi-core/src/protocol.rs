//! Wire format for the DeviceWISE API.
//!
//! Every call is a single POST of
//!
//! ```text
//! {"auth": {"applicationToken": "..", "sessionId": ".."} | null,
//!  "data": {"command": "..", "params": {..}}}
//! ```
//!
//! answered by
//!
//! ```text
//! {"data": {"params": {..}, "errorMessage": ".."}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered parameter mapping carried in `data.params`.
pub type Params = Map<String, Value>;

/// Command names understood by the endpoint.
pub mod commands {
    pub const PING: &str = "api.ping";
    pub const AUTHENTICATE: &str = "api.authenticate";
    pub const ORG_LIST: &str = "user.org.list";
    pub const ORG_SET: &str = "user.org.set";
    pub const GATEWAY_LIST: &str = "gateway.list";
    pub const GATEWAY_DETAILS: &str = "gateway.details";
    pub const ATTRIBUTE_LIST: &str = "gateway.attribute.list";
    pub const USEROP_LIST: &str = "gateway.userop.list";
    pub const USEROP_EXEC: &str = "gateway.userop.exec";
    pub const REMTRIGGER_LIST: &str = "gateway.remtrigger.list";
    pub const REMTRIGGER_EXEC: &str = "gateway.remtrigger.exec";
}

/// Commands sent with `"auth": null`.
pub const NO_AUTH_COMMANDS: &[&str] = &[commands::PING, commands::AUTHENTICATE];

/// Whether `command` needs an auth block.
pub fn requires_auth(command: &str) -> bool {
    !NO_AUTH_COMMANDS.contains(&command)
}

/// The `auth` section of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthBlock<'a> {
    pub application_token: &'a str,
    pub session_id: &'a str,
}

/// The `data` section of a request.
#[derive(Debug, Clone, Serialize)]
pub struct CommandData<'a> {
    pub command: &'a str,
    pub params: &'a Params,
}

/// Outbound request envelope. `auth` serializes as `null` when absent.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope<'a> {
    pub auth: Option<AuthBlock<'a>>,
    pub data: CommandData<'a>,
}

/// Inbound response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    pub data: Option<ResponseData>,
}

/// The `data` section of a response.
///
/// `params` is kept as a raw value: servers emit `[]` for an empty mapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseData {
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

impl ResponseData {
    /// The error message, if present and non-empty.
    pub fn error(&self) -> Option<&str> {
        self.error_message.as_deref().filter(|m| !m.is_empty())
    }

    /// `params` as a mapping. Missing, null and `[]` all read as empty;
    /// any other non-object yields `None`.
    pub fn into_params(self) -> Option<Params> {
        match self.params {
            None | Some(Value::Null) => Some(Params::new()),
            Some(Value::Object(map)) => Some(map),
            Some(Value::Array(items)) if items.is_empty() => Some(Params::new()),
            Some(_) => None,
        }
    }
}

/// One entry of a `{key, value}` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

impl From<KeyValue> for Value {
    fn from(kv: KeyValue) -> Self {
        let mut entry = Map::with_capacity(2);
        entry.insert("key".to_string(), Value::String(kv.key));
        entry.insert("value".to_string(), kv.value);
        Value::Object(entry)
    }
}

/// Convert an ordered associative input into a `[{key, value}, ...]` array.
///
/// Used for user-operation inputs and remote-trigger notification items.
pub fn key_value_list<I, K, V>(items: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    Value::Array(
        items
            .into_iter()
            .map(|(key, value)| {
                Value::from(KeyValue {
                    key: key.into(),
                    value: value.into(),
                })
            })
            .collect(),
    )
}

/// Attribute classes accepted by `gateway.attribute.list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    User,
    System,
    #[default]
    Both,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::User => "user",
            AttributeType::System => "system",
            AttributeType::Both => "both",
        }
    }
}
