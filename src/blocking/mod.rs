//! Blocking API, enabled with the `blocking` feature.
//!
//! Same endpoints as [`crate::Client`], built on `reqwest::blocking`. Must not be used from
//! within an async runtime.

pub mod client;

use reqwest::blocking::{Client as ReqwestClient, Request};
use serde_json::Value;

pub use self::client::Client;
pub use crate::pagination::blocking::PaginatedCollection;
#[cfg(feature = "ws")]
pub use crate::ws::blocking::Client as WsClient;
use crate::{Result, parse_body, status_error};

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
fn request(client: &ReqwestClient, request: Request) -> Result<Value> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request)?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(status_error(status_code, method, path, message));
    }

    let body = response.text()?;
    parse_body(&body)
}
