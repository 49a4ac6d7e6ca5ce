use reqwest::Method;
use reqwest::blocking::Client as ReqwestClient;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret as _, SecretString};
use serde_json::{Value, json};
use url::Url;

use crate::error::Error;
use crate::executor::{ApiRequest, BlockingRequestExecutor};
use crate::pagination::blocking::PaginatedCollection;
use crate::serde_helpers::deserialize_with_warnings;
use crate::types::{Envelope, ListRequest, PowerSignal, WebsocketCredentials};
use crate::{API_KEY_VAR, Result, ToQueryParams as _};

/// Blocking HTTP client for the panel's client and application APIs.
///
/// ```no_run
/// use pterodactyl_client_sdk::blocking::Client;
/// use pterodactyl_client_sdk::types::ListRequest;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("https://panel.example.com", "ptla_key")?;
/// let users = client.list_users(&ListRequest::default())?.collect_all()?;
/// println!("{} users", users.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
}

impl Client {
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

    pub fn from_env(host: &str) -> Result<Client> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_e| Error::validation(format!("{API_KEY_VAR} is not set")))?;
        Self::new(host, api_key)
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    fn list(&self, endpoint: &str, request: &ListRequest) -> Result<PaginatedCollection<Client>> {
        let query = request.query_params();
        let response = self.execute(ApiRequest::get(endpoint, query.clone()))?;

        Ok(PaginatedCollection::from_response(self.clone(), endpoint, response)?.with_query(query))
    }

    pub fn list_servers(&self, request: &ListRequest) -> Result<PaginatedCollection<Client>> {
        self.list("client", request)
    }

    pub fn list_application_servers(
        &self,
        request: &ListRequest,
    ) -> Result<PaginatedCollection<Client>> {
        self.list("application/servers", request)
    }

    pub fn list_users(&self, request: &ListRequest) -> Result<PaginatedCollection<Client>> {
        self.list("application/users", request)
    }

    pub fn websocket_credentials(&self, server_id: &str) -> Result<WebsocketCredentials> {
        let response = self.execute(ApiRequest::get(
            format!("client/servers/{server_id}/websocket"),
            Vec::new(),
        ))?;

        let envelope: Envelope<WebsocketCredentials> = deserialize_with_warnings(response)?;
        Ok(envelope.data)
    }

    /// A disconnected blocking console client for `server_id` that renews its own token.
    #[cfg(feature = "ws")]
    pub fn websocket(&self, server_id: &str) -> Result<crate::ws::blocking::Client> {
        let credentials = self.websocket_credentials(server_id)?;
        let client = self.clone();
        let server_id = server_id.to_owned();

        Ok(crate::ws::blocking::Client::from_credentials(credentials)
            .with_refresher(move || client.websocket_credentials(&server_id)))
    }

    pub fn send_power_action(&self, server_id: &str, signal: PowerSignal) -> Result<Value> {
        let request = ApiRequest::builder()
            .endpoint(format!("client/servers/{server_id}/power"))
            .method(Method::POST)
            .body(json!({ "signal": signal }))
            .build();

        self.execute(request)
    }

    pub fn send_console_command(&self, server_id: &str, command: &str) -> Result<Value> {
        let request = ApiRequest::builder()
            .endpoint(format!("client/servers/{server_id}/command"))
            .method(Method::POST)
            .body(json!({ "command": command }))
            .build();

        self.execute(request)
    }
}

impl BlockingRequestExecutor for Client {
    fn execute(&self, request: ApiRequest) -> Result<Value> {
        let url = request.url(&self.host)?;
        let mut builder = self.client.request(request.method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        super::request(&self.client, builder.build()?)
    }
}
