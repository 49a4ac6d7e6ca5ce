//! Frame envelope, event filtering and the per-frame classification step shared by the async and
//! blocking clients.

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

use super::error::WsError;
use crate::Result;

/// Sent right after the socket opens, and again after every token refresh.
pub const AUTH_EVENT: &str = "auth";
/// Sent by Wings shortly before the current token expires.
pub const TOKEN_EXPIRING_EVENT: &str = "token expiring";

/// One `{"event": ..., "args": [...]}` frame, inbound or outbound.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMessage {
    pub event: String,
    /// Missing on some inbound frames, e.g. `{"event":"token expiring"}`
    #[serde(default)]
    pub args: Vec<Value>,
}

impl StreamMessage {
    #[must_use]
    pub fn new<S: Into<String>>(event: S, args: Vec<Value>) -> Self {
        Self {
            event: event.into(),
            args,
        }
    }

    #[must_use]
    pub fn is_token_expiring(&self) -> bool {
        self.event == TOKEN_EXPIRING_EVENT
    }

    /// Serialized text frame.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Which events `listen` hands to the consumer.
///
/// An empty `include` admits every event. `exclude` always wins.
///
/// ```
/// use pterodactyl_client_sdk::ws::EventFilter;
///
/// let filter = EventFilter::builder()
///     .include(vec!["console output".to_owned(), "stats".to_owned()])
///     .build();
///
/// assert!(filter.admits("stats"));
/// assert!(!filter.admits("status"));
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct EventFilter {
    #[builder(default)]
    pub include: Vec<String>,
    #[builder(default)]
    pub exclude: Vec<String>,
}

impl EventFilter {
    /// Admits every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn admits(&self, event: &str) -> bool {
        if self.exclude.iter().any(|e| e == event) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|e| e == event)
    }
}

/// What a received transport frame means for the listen loop.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Inbound {
    /// Nothing to hand over: control frames, binary frames, malformed text
    Skip,
    Message(StreamMessage),
    /// The peer closed the connection
    Closed,
}

pub(crate) fn classify(frame: Message) -> Inbound {
    match frame {
        Message::Text(text) => match serde_json::from_str::<StreamMessage>(&text) {
            Ok(message) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(event = %message.event, "Received WebSocket message");
                Inbound::Message(message)
            }
            Err(e) => {
                let error = WsError::MessageParse(e);
                #[cfg(feature = "tracing")]
                tracing::warn!(text = %text.as_str(), error = %error, "Received non-JSON message");
                #[cfg(not(feature = "tracing"))]
                let _ = (&text, &error);
                Inbound::Skip
            }
        },
        Message::Close(frame) => {
            #[cfg(feature = "tracing")]
            tracing::info!(?frame, "Websocket connection closed");
            #[cfg(not(feature = "tracing"))]
            let _ = &frame;
            Inbound::Closed
        }
        _ => Inbound::Skip,
    }
}
