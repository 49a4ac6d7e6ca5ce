use std::fmt;
use std::time::Instant;

use async_stream::stream;
use futures::future::BoxFuture;
use futures::{SinkExt as _, Stream, StreamExt as _};
use secrecy::{ExposeSecret as _, SecretString};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use super::config::Config;
use super::error::WsError;
use super::message::{AUTH_EVENT, EventFilter, Inbound, StreamMessage, classify};
use super::refresh::TokenRefresher;
use crate::Result;
use crate::types::{PowerSignal, WebsocketCredentials};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection state tracking.
///
/// Transitions are linear: `Disconnected -> Connected -> Closed`. `Closed` is terminal.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected yet
    Disconnected,
    /// Socket open and `auth` sent
    Connected {
        /// When the connection was established
        since: Instant,
    },
    /// Closed locally or by the peer
    Closed,
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Client for a server's console websocket on Wings.
///
/// One client owns one socket and is driven by a single reader. Every frame goes out as
/// `{"event": ..., "args": [...]}` text, starting with `auth` right after the socket opens.
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt as _;
/// use pterodactyl_client_sdk::ws::{Client, EventFilter};
/// use tokio::pin;
///
/// # async fn example() -> pterodactyl_client_sdk::Result<()> {
/// let mut console = Client::new("wss://node.example.com:8080/api/servers/8d9a9a58/ws", "jwt");
/// console.connect().await?;
/// console.send_command("say hello").await?;
///
/// let filter = EventFilter::builder().include(vec!["console output".to_owned()]).build();
/// {
///     let messages = console.listen(filter)?;
///     pin!(messages);
///     while let Some(message) = messages.next().await {
///         println!("{:?}", message.args);
///     }
/// }
///
/// console.close().await;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    url: String,
    token: SecretString,
    config: Config,
    refresher: Option<Box<dyn TokenRefresher>>,
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
    /// Creates a disconnected client. Nothing is opened until [`connect`](Self::connect).
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

    /// Creates a disconnected client from the credentials endpoint response.
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

    /// Called whenever Wings sends `token expiring`.
    #[must_use]
    pub fn with_refresher<R: TokenRefresher + 'static>(mut self, refresher: R) -> Self {
        self.refresher = Some(Box::new(refresher));
        self
    }

    /// Uses an already open socket instead of dialing `url` on [`connect`](Self::connect).
    #[must_use]
    pub fn with_transport(mut self, socket: WsStream) -> Self {
        self.socket = Some(socket);
        self
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The token presented in the most recent `auth` frame.
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
    ///
    /// # Errors
    ///
    /// [`WsError::Connection`] if the socket cannot be opened, [`WsError::AlreadyConnected`] when
    /// already connected and [`WsError::ConnectionClosed`] once the client has been closed.
    pub async fn connect(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Disconnected => {}
            ConnectionState::Connected { .. } => return Err(WsError::AlreadyConnected.into()),
            ConnectionState::Closed => return Err(WsError::ConnectionClosed.into()),
        }

        let socket = match self.socket.take() {
            Some(socket) => socket,
            None => {
                let (socket, _) = connect_async(self.url.as_str())
                    .await
                    .map_err(WsError::Connection)?;
                socket
            }
        };

        self.socket = Some(socket);
        self.state = ConnectionState::Connected {
            since: Instant::now(),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(url = %self.url, "Websocket connected");

        self.authenticate().await
    }

    /// Sends one `{"event", "args"}` frame.
    ///
    /// # Errors
    ///
    /// [`WsError::NotConnected`] unless connected, in which case nothing is written.
    pub async fn send<S: Into<String>>(&mut self, event: S, args: Vec<Value>) -> Result<()> {
        let frame = StreamMessage::new(event, args).to_frame()?;
        let socket = self.connected_socket()?;

        socket
            .send(Message::Text(frame.into()))
            .await
            .map_err(WsError::Connection)?;
        Ok(())
    }

    async fn authenticate(&mut self) -> Result<()> {
        let token = Value::String(self.token.expose_secret().to_owned());
        self.send(AUTH_EVENT, vec![token]).await
    }

    /// Runs `command` on the server console.
    pub async fn send_command<S: Into<String>>(&mut self, command: S) -> Result<()> {
        let event = self.config.events.send_command.clone();
        self.send(event, vec![Value::String(command.into())]).await
    }

    pub async fn send_power_action(&mut self, signal: PowerSignal) -> Result<()> {
        let event = self.config.events.set_state.clone();
        self.send(event, vec![Value::String(signal.to_string())]).await
    }

    pub async fn request_logs(&mut self) -> Result<()> {
        let event = self.config.events.logs.clone();
        self.send(event, Vec::new()).await
    }

    pub async fn request_stats(&mut self) -> Result<()> {
        let event = self.config.events.stats.clone();
        self.send(event, Vec::new()).await
    }

    pub async fn request_status(&mut self) -> Result<()> {
        let event = self.config.events.status.clone();
        self.send(event, Vec::new()).await
    }

    /// Stream of inbound messages admitted by `filter`, in arrival order.
    ///
    /// Malformed frames are logged and skipped. A `token expiring` frame triggers the refresher
    /// (if any) before filtering, so it is handled even when `filter` hides it. The stream ends
    /// when the peer closes the socket or the transport fails, after which the client is
    /// [`Closed`](ConnectionState::Closed). Dropping the stream leaves the socket open.
    ///
    /// # Errors
    ///
    /// [`WsError::NotConnected`] unless connected.
    pub fn listen(&mut self, filter: EventFilter) -> Result<impl Stream<Item = StreamMessage> + '_> {
        self.connected_socket()?;

        Ok(stream! {
            loop {
                let Some(socket) = self.socket.as_mut() else {
                    break;
                };

                let frame = match socket.next().await {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => {
                        #[cfg(feature = "tracing")]
                        tracing::error!(error = %e, "Error receiving message");
                        #[cfg(not(feature = "tracing"))]
                        let _ = &e;
                        self.mark_closed();
                        break;
                    }
                    None => {
                        #[cfg(feature = "tracing")]
                        tracing::info!("Websocket connection closed");
                        self.mark_closed();
                        break;
                    }
                };

                match classify(frame) {
                    Inbound::Skip => {}
                    Inbound::Closed => {
                        // Writes the close reply tungstenite queued on read
                        if let Err(e) = socket.flush().await {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(error = %e, "Error completing close handshake");
                            #[cfg(not(feature = "tracing"))]
                            let _ = &e;
                        }
                        self.mark_closed();
                        break;
                    }
                    Inbound::Message(message) => {
                        if message.is_token_expiring() {
                            self.refresh_token().await;
                        }

                        if filter.admits(&message.event) {
                            yield message;
                        }
                    }
                }
            }
        })
    }

    /// Closes the socket if one is open. Safe to call any number of times, from any state.
    pub async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Err(e) = socket.close(None).await {
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

    /// Connects, runs `f`, then closes on every exit path of `f`.
    ///
    /// ```no_run
    /// # use pterodactyl_client_sdk::ws::Client;
    /// # async fn example(mut console: Client) -> pterodactyl_client_sdk::Result<()> {
    /// console
    ///     .with_connection(|console| Box::pin(async move { console.request_stats().await }))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_connection<F, T>(&mut self, f: F) -> Result<T>
    where
        F: for<'conn> FnOnce(&'conn mut Client) -> BoxFuture<'conn, Result<T>>,
    {
        if let Err(e) = self.connect().await {
            self.close().await;
            return Err(e);
        }

        let result = f(self).await;
        self.close().await;
        result
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

    /// Swaps in a fresh token and re-authenticates. Failures are logged, never returned.
    async fn refresh_token(&mut self) {
        let Some(refresher) = self.refresher.as_ref() else {
            return;
        };

        match refresher.refresh().await {
            Ok(credentials) => {
                self.token = credentials.token;
                match self.authenticate().await {
                    Ok(()) => {
                        #[cfg(feature = "tracing")]
                        tracing::info!("Websocket token refreshed");
                    }
                    Err(e) => {
                        #[cfg(feature = "tracing")]
                        tracing::error!(error = %e, "Failed to re-authenticate websocket");
                        #[cfg(not(feature = "tracing"))]
                        let _ = &e;
                    }
                }
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
}
