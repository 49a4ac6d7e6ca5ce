//! Async HTTP client for the panel API.
//!
//! # Example
//!
//! ```no_run
//! use pterodactyl_client_sdk::Client;
//! use pterodactyl_client_sdk::types::{ListRequest, PowerSignal};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("https://panel.example.com", "ptlc_key")?;
//!
//! let servers = client.list_servers(&ListRequest::default()).await?.collect_all().await?;
//! for server in &servers {
//!     let id = server["attributes"]["identifier"].as_str().unwrap_or_default();
//!     client.send_power_action(id, PowerSignal::Restart).await?;
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::{
    Client as ReqwestClient, Method,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use secrecy::{ExposeSecret as _, SecretString};
use serde_json::{Value, json};
use url::Url;

use crate::error::Error;
use crate::executor::{ApiRequest, RequestExecutor};
use crate::pagination::PaginatedCollection;
use crate::serde_helpers::deserialize_with_warnings;
use crate::types::{Envelope, ListRequest, PowerSignal, WebsocketCredentials};
use crate::{API_KEY_VAR, Result, ToQueryParams as _};

/// HTTP client for the panel's client and application APIs.
///
/// Cheap to clone: clones share one connection pool. Collections returned by the list endpoints
/// carry a clone so they can fetch further pages on their own.
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
}

impl Client {
    /// Creates a client for the panel at `host`, authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the key is not a valid header value, or the HTTP
    /// client cannot be created.
    pub fn new<K: Into<String>>(host: &str, api_key: K) -> Result<Client> {
        let api_key = SecretString::from(api_key.into());
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(crate::USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);
        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self {
            host: Url::parse(host)?,
            client,
        })
    }

    /// Like [`Client::new`], reading the key from `PTERODACTYL_API_KEY`.
    pub fn from_env(host: &str) -> Result<Client> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_e| Error::validation(format!("{API_KEY_VAR} is not set")))?;
        Self::new(host, api_key)
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    async fn list(
        &self,
        endpoint: &str,
        request: &ListRequest,
    ) -> Result<PaginatedCollection<Client>> {
        let query = request.query_params();
        let response = self
            .execute(ApiRequest::get(endpoint, query.clone()))
            .await?;

        Ok(PaginatedCollection::from_response(self.clone(), endpoint, response)?.with_query(query))
    }

    /// Servers the API key's user can access: `GET /api/client`.
    pub async fn list_servers(&self, request: &ListRequest) -> Result<PaginatedCollection<Client>> {
        self.list("client", request).await
    }

    /// Every server on the panel: `GET /api/application/servers`. Needs an application key.
    pub async fn list_application_servers(
        &self,
        request: &ListRequest,
    ) -> Result<PaginatedCollection<Client>> {
        self.list("application/servers", request).await
    }

    /// Every user on the panel: `GET /api/application/users`. Needs an application key.
    pub async fn list_users(&self, request: &ListRequest) -> Result<PaginatedCollection<Client>> {
        self.list("application/users", request).await
    }

    /// Generates a token and socket URL for the server's console websocket.
    pub async fn websocket_credentials(&self, server_id: &str) -> Result<WebsocketCredentials> {
        let response = self
            .execute(ApiRequest::get(
                format!("client/servers/{server_id}/websocket"),
                Vec::new(),
            ))
            .await?;

        let envelope: Envelope<WebsocketCredentials> = deserialize_with_warnings(response)?;
        Ok(envelope.data)
    }

    /// A disconnected console websocket client for `server_id` that renews its own token.
    #[cfg(feature = "ws")]
    pub async fn websocket(&self, server_id: &str) -> Result<crate::ws::Client> {
        let credentials = self.websocket_credentials(server_id).await?;

        Ok(
            crate::ws::Client::from_credentials(credentials).with_refresher(CredentialsRefresher {
                client: self.clone(),
                server_id: server_id.to_owned(),
            }),
        )
    }

    /// Sends a power signal to the server: `POST /api/client/servers/{server}/power`.
    pub async fn send_power_action(&self, server_id: &str, signal: PowerSignal) -> Result<Value> {
        let request = ApiRequest::builder()
            .endpoint(format!("client/servers/{server_id}/power"))
            .method(Method::POST)
            .body(json!({ "signal": signal }))
            .build();

        self.execute(request).await
    }

    /// Runs a console command: `POST /api/client/servers/{server}/command`.
    pub async fn send_console_command(&self, server_id: &str, command: &str) -> Result<Value> {
        let request = ApiRequest::builder()
            .endpoint(format!("client/servers/{server_id}/command"))
            .method(Method::POST)
            .body(json!({ "command": command }))
            .build();

        self.execute(request).await
    }
}

#[async_trait]
impl RequestExecutor for Client {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let url = request.url(&self.host)?;
        let mut builder = self.client.request(request.method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        crate::request(&self.client, builder.build()?).await
    }
}

/// Asks the panel for new websocket credentials when Wings says the token is expiring.
#[cfg(feature = "ws")]
#[derive(Clone, Debug)]
struct CredentialsRefresher {
    client: Client,
    server_id: String,
}

#[cfg(feature = "ws")]
#[async_trait]
impl crate::ws::TokenRefresher for CredentialsRefresher {
    async fn refresh(&self) -> Result<WebsocketCredentials> {
        self.client.websocket_credentials(&self.server_id).await
    }
}
