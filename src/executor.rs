//! The request seam shared by every API surface in this crate.
//!
//! Paginated collections and endpoint helpers never talk to the network themselves. They describe
//! the call as an [`ApiRequest`] and hand it to a [`RequestExecutor`] (async) or a
//! [`BlockingRequestExecutor`], which returns the parsed JSON body or a typed [`Error`].
//!
//! [`Error`]: crate::error::Error

use async_trait::async_trait;
use bon::Builder;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::Result;
use crate::error::Error;

/// A single call against the panel API, relative to its `/api/` root.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct ApiRequest {
    /// Path below `/api/`, e.g. `client/servers/1a7ce997/websocket`
    pub endpoint: String,
    #[builder(default = Method::GET)]
    pub method: Method,
    /// Query parameters, sent in order
    #[builder(default)]
    pub query: Vec<(String, String)>,
    /// Optional JSON body
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Shorthand for a `GET` with query parameters.
    #[must_use]
    pub fn get<S: Into<String>>(endpoint: S, query: Vec<(String, String)>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: Method::GET,
            query,
            body: None,
        }
    }

    /// Resolves this request against the panel `host`, e.g. `https://panel.example.com`.
    pub fn url(&self, host: &Url) -> Result<Url> {
        let endpoint = self.endpoint.trim_matches('/');
        if endpoint.is_empty() {
            return Err(Error::validation("No API endpoint was specified"));
        }

        let base = host.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/api/{endpoint}"))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(url)
    }
}

/// Issues an [`ApiRequest`] and returns the parsed JSON response.
///
/// Implemented by [`crate::Client`]; tests and alternative transports can provide their own.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value>;
}

/// Blocking counterpart of [`RequestExecutor`].
pub trait BlockingRequestExecutor {
    fn execute(&self, request: ApiRequest) -> Result<Value>;
}

#[async_trait]
impl<E: RequestExecutor + ?Sized> RequestExecutor for &E {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        (**self).execute(request).await
    }
}

impl<E: BlockingRequestExecutor + ?Sized> BlockingRequestExecutor for &E {
    fn execute(&self, request: ApiRequest) -> Result<Value> {
        (**self).execute(request)
    }
}
