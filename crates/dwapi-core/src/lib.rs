//! dwapi - blocking client for the DeviceWISE public API.
//!
//! Every API command is a single JSON POST to one endpoint. This crate builds
//! the `{auth, data: {command, params}}` envelope, attaches the application
//! token and session ID for commands that need them, and unwraps the
//! response's `data.params` or `data.errorMessage`.
//!
//! # Example
//!
//! ```rust,no_run
//! use dwapi::{ClientOptions, DwApiClient, OrgCredential, Params};
//!
//! fn main() -> dwapi::Result<()> {
//!     let options = ClientOptions::new("https://dw.example.com/api")
//!         .with_application_token("app-token");
//!     let mut client = DwApiClient::new(options)?;
//!
//!     client.login(None, Some(OrgCredential::token("org-token")))?;
//!
//!     let gateways = client.list_gateways()?;
//!     println!("{}", serde_json::Value::Object(gateways));
//!
//!     client.exec_user_op("cloudlink-1", "restart", Params::new())?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod operations;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{DwApiClient, Reply};
pub use config::{ClientOptions, EnvConfig, NetworkConfig};
pub use error::{DwApiError, Result, TransportCause};
pub use operations::OrgCredential;
pub use protocol::{commands, AttributeType, KeyValue, Params};
pub use transport::{HttpTransport, Transport};
