//! Console websocket for a single server.
//!
//! Wings exposes a websocket per server that streams console output, resource stats and power
//! state changes, and accepts commands. Every frame, in both directions, is a JSON text frame of
//! the form `{"event": <name>, "args": [...]}`.
//!
//! # Architecture
//!
//! - [`Client`]: async client on `tokio-tungstenite`
//! - [`blocking::Client`]: the same client on blocking `tungstenite` (requires `blocking`)
//! - [`message`]: frame envelope, [`EventFilter`] and the per-frame step both clients share
//! - [`TokenRefresher`]: hook called when Wings announces `token expiring`
//!
//! Credentials usually come from [`crate::Client::websocket`], which also wires up a refresher
//! that asks the panel for a new token.

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod refresh;

pub use client::{Client, ConnectionState};
pub use config::{Config, EventNames};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use message::{EventFilter, StreamMessage};
#[cfg(feature = "blocking")]
pub use refresh::BlockingTokenRefresher;
pub use refresh::TokenRefresher;
