//! Request and response types shared by the HTTP and websocket clients.

use std::str::FromStr;

use bon::Builder;
pub use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_with::{StringWithSeparator, formats::CommaSeparator, serde_as};

use crate::error::Error;

/// The `{ "data": ... }` wrapper the panel puts around some single-resource responses.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Credentials for a server's console websocket, returned by
/// `GET /api/client/servers/{server}/websocket`.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct WebsocketCredentials {
    /// Short-lived JWT presented in the `auth` frame
    pub token: SecretString,
    /// The Wings websocket URL, e.g. `wss://node.example.com:8080/api/servers/{uuid}/ws`
    pub socket: String,
}

impl WebsocketCredentials {
    #[must_use]
    pub fn new<T: Into<String>, S: Into<String>>(token: T, socket: S) -> Self {
        Self {
            token: SecretString::from(token.into()),
            socket: socket.into(),
        }
    }
}

/// Query parameters accepted by the paginated list endpoints.
///
/// ```
/// use pterodactyl_client_sdk::types::ListRequest;
///
/// let request = ListRequest::builder()
///     .include(vec!["egg".to_owned(), "subusers".to_owned()])
///     .per_page(50)
///     .build();
/// ```
#[serde_as]
#[non_exhaustive]
#[derive(Clone, Debug, Default, Serialize, Builder)]
pub struct ListRequest {
    /// Relationships to include, sent comma separated as `include=egg,subusers`
    #[serde_as(as = "Option<StringWithSeparator::<CommaSeparator, String>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// Power state change accepted by both the `power` endpoint and the `set state` websocket event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum PowerSignal {
    /// Runs the server's startup command.
    Start,
    /// Runs the egg's stop command.
    Stop,
    /// Stops the server, then starts it again.
    Restart,
    /// Terminates all server processes immediately. Can corrupt server files.
    Kill,
}

impl FromStr for PowerSignal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "restart" => Ok(Self::Restart),
            "kill" => Ok(Self::Kill),
            other => Err(Error::validation(format!(
                "Invalid power signal sent({other}), must be one of: start, stop, restart, kill"
            ))),
        }
    }
}
