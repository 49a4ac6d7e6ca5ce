//! Blocking console websocket client.
//!
//! Mirrors [`super::Client`] on a plain [`std::net::TcpStream`]: every call blocks the calling
//! thread, and [`Client::listen`] is an [`Iterator`] instead of a stream.

use std::fmt;
use std::net::TcpStream;
use std::ops::{Deref, DerefMut};
use std::time::Instant;

use secrecy::{ExposeSecret as _, SecretString};
use serde_json::Value;
use tokio_tungstenite::tungstenite::stream::MaybeTlsStream;
use tokio_tungstenite::tungstenite::{self, Message, WebSocket};

use super::client::ConnectionState;
use super::config::Config;
use super::error::WsError;
use super::message::{AUTH_EVENT, EventFilter, Inbound, StreamMessage, classify};
use super::refresh::BlockingTokenRefresher;
use crate::Result;
use crate::types::{PowerSignal, WebsocketCredentials};

pub type WsStream = WebSocket<MaybeTlsStream<TcpStream>>;

/// Blocking client for a server's console websocket on Wings.
///
/// ```no_run
/// use pterodactyl_client_sdk::ws::EventFilter;
/// use pterodactyl_client_sdk::ws::blocking::Client;
///
/// # fn example() -> pterodactyl_client_sdk::Result<()> {
/// let mut console = Client::new("wss://node.example.com:8080/api/servers/8d9a9a58/ws", "jwt");
///
/// let mut session = console.session()?;
/// session.request_stats()?;
/// for message in session.listen(EventFilter::default())?.take(3) {
///     println!("{}: {:?}", message.event, message.args);
/// }
/// // Socket closed when `session` goes out of scope
/// # Ok(())
/// # }
/// ```
pub struct Client {
    url: String,
    token: SecretString,
    config: Config,
    refresher: Option<Box<dyn BlockingTokenRefresher>>,
    socket: Option<WsStream>,
    state: ConnectionState,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("token", &self.token)
            .field("config", &self.config)
            .field("refresher", &self.refresher.is_some())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Client {
    #[must_use]
    pub fn new<U: Into<String>, T: Into<String>>(url: U, token: T) -> Self {
        Self {
            url: url.into(),
            token: SecretString::from(token.into()),
            config: Config::default(),
            refresher: None,
            socket: None,
            state: ConnectionState::Disconnected,
        }
    }

    #[must_use]
    pub fn from_credentials(credentials: WebsocketCredentials) -> Self {
        Self {
            url: credentials.socket,
            token: credentials.token,
            config: Config::default(),
            refresher: None,
            socket: None,
            state: ConnectionState::Disconnected,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_refresher<R: BlockingTokenRefresher + 'static>(mut self, refresher: R) -> Self {
        self.refresher = Some(Box::new(refresher));
        self
    }

    #[must_use]
    pub fn with_transport(mut self, socket: WsStream) -> Self {
        self.socket = Some(socket);
        self
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens the socket (unless one was supplied) and authenticates.
    pub fn connect(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Disconnected => {}
            ConnectionState::Connected { .. } => return Err(WsError::AlreadyConnected.into()),
            ConnectionState::Closed => return Err(WsError::ConnectionClosed.into()),
        }

        let socket = match self.socket.take() {
            Some(socket) => socket,
            None => {
                let (socket, _) =
                    tungstenite::connect(self.url.as_str()).map_err(WsError::Connection)?;
                socket
            }
        };

        self.socket = Some(socket);
        self.state = ConnectionState::Connected {
            since: Instant::now(),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(url = %self.url, "Websocket connected");

        self.authenticate()
    }

    pub fn send<S: Into<String>>(&mut self, event: S, args: Vec<Value>) -> Result<()> {
        let frame = StreamMessage::new(event, args).to_frame()?;
        let socket = self.connected_socket()?;

        socket
            .send(Message::Text(frame.into()))
            .map_err(WsError::Connection)?;
        Ok(())
    }

    fn authenticate(&mut self) -> Result<()> {
        let token = Value::String(self.token.expose_secret().to_owned());
        self.send(AUTH_EVENT, vec![token])
    }

    pub fn send_command<S: Into<String>>(&mut self, command: S) -> Result<()> {
        let event = self.config.events.send_command.clone();
        self.send(event, vec![Value::String(command.into())])
    }

    pub fn send_power_action(&mut self, signal: PowerSignal) -> Result<()> {
        let event = self.config.events.set_state.clone();
        self.send(event, vec![Value::String(signal.to_string())])
    }

    pub fn request_logs(&mut self) -> Result<()> {
        let event = self.config.events.logs.clone();
        self.send(event, Vec::new())
    }

    pub fn request_stats(&mut self) -> Result<()> {
        let event = self.config.events.stats.clone();
        self.send(event, Vec::new())
    }

    pub fn request_status(&mut self) -> Result<()> {
        let event = self.config.events.status.clone();
        self.send(event, Vec::new())
    }

    /// Iterator over inbound messages admitted by `filter`. Each `next` blocks until a frame
    /// arrives. See [`super::Client::listen`] for the per-frame rules.
    pub fn listen(&mut self, filter: EventFilter) -> Result<Listener<'_>> {
        self.connected_socket()?;

        Ok(Listener {
            client: self,
            filter,
        })
    }

    /// Closes the socket if one is open. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(e) = socket.close(None).and_then(|()| socket.flush()) {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %e, "Error closing websocket");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(url = %self.url, "Websocket closed");
        }

        self.state = ConnectionState::Closed;
    }

    /// Connects, runs `f`, then closes whatever `f` returned.
    pub fn with_connection<F, T>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Client) -> Result<T>,
    {
        let mut session = self.session()?;
        f(&mut session)
    }

    /// Connects and returns a guard that closes the socket when dropped, including on unwind.
    pub fn session(&mut self) -> Result<Session<'_>> {
        if let Err(e) = self.connect() {
            self.close();
            return Err(e);
        }

        Ok(Session { client: self })
    }

    fn connected_socket(&mut self) -> Result<&mut WsStream> {
        match self.socket.as_mut() {
            Some(socket) if self.state.is_connected() => Ok(socket),
            _ => Err(WsError::NotConnected.into()),
        }
    }

    fn mark_closed(&mut self) {
        self.socket = None;
        self.state = ConnectionState::Closed;
    }

    fn refresh_token(&mut self) {
        let Some(refresher) = self.refresher.as_ref() else {
            return;
        };

        match refresher.refresh() {
            Ok(credentials) => {
                self.token = credentials.token;
                if let Err(e) = self.authenticate() {
                    #[cfg(feature = "tracing")]
                    tracing::error!(error = %e, "Failed to re-authenticate websocket");
                    #[cfg(not(feature = "tracing"))]
                    let _ = &e;
                    return;
                }

                #[cfg(feature = "tracing")]
                tracing::info!("Websocket token refreshed");
            }
            Err(e) => {
                let error = WsError::Refresh(e);
                #[cfg(feature = "tracing")]
                tracing::error!(error = %error, "Failed to refresh websocket token");
                #[cfg(not(feature = "tracing"))]
                let _ = &error;
            }
        }
    }

    /// Reads frames until one is admitted by `filter` or the connection ends.
    fn next_message(&mut self, filter: &EventFilter) -> Option<StreamMessage> {
        loop {
            let socket = self.socket.as_mut()?;

            let frame = match socket.read() {
                Ok(frame) => frame,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!("Websocket connection closed");
                    self.mark_closed();
                    return None;
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(error = %e, "Error receiving message");
                    #[cfg(not(feature = "tracing"))]
                    let _ = &e;
                    self.mark_closed();
                    return None;
                }
            };

            match classify(frame) {
                Inbound::Skip => {}
                Inbound::Closed => {
                    // Writes the close reply tungstenite queued on read
                    if let Err(e) = socket.flush() {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(error = %e, "Error completing close handshake");
                        #[cfg(not(feature = "tracing"))]
                        let _ = &e;
                    }
                    self.mark_closed();
                    return None;
                }
                Inbound::Message(message) => {
                    if message.is_token_expiring() {
                        self.refresh_token();
                    }

                    if filter.admits(&message.event) {
                        return Some(message);
                    }
                }
            }
        }
    }
}

/// Iterator returned by [`Client::listen`]. Dropping it leaves the socket open.
#[derive(Debug)]
pub struct Listener<'client> {
    client: &'client mut Client,
    filter: EventFilter,
}

impl Iterator for Listener<'_> {
    type Item = StreamMessage;

    fn next(&mut self) -> Option<Self::Item> {
        self.client.next_message(&self.filter)
    }
}

/// A connected [`Client`] that is closed on drop.
#[derive(Debug)]
pub struct Session<'client> {
    client: &'client mut Client,
}

impl Deref for Session<'_> {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        self.client
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.client.close();
    }
}
