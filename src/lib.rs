#![cfg_attr(doc, doc = include_str!("../README.md"))]

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod client;
pub mod error;
pub mod executor;
pub mod pagination;
pub(crate) mod serde_helpers;
pub mod types;
#[cfg(feature = "ws")]
pub mod ws;

use reqwest::{Request, StatusCode};
use serde::Serialize;
use serde_json::Value;

pub use crate::client::Client;
use crate::error::Error;
pub use crate::executor::{ApiRequest, BlockingRequestExecutor, RequestExecutor};
pub use crate::pagination::{Page, PaginatedCollection};

pub type Result<T> = std::result::Result<T, Error>;

pub const API_KEY_VAR: &str = "PTERODACTYL_API_KEY";

const USER_AGENT: &str = concat!("pterodactyl-client-sdk/", env!("CARGO_PKG_VERSION"));

/// Trait for converting request types to URL query parameters.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] to serialize the struct fields and returns them as ordered
/// key/value pairs, ready to be merged with pagination parameters.
pub trait ToQueryParams: Serialize {
    fn query_params(&self) -> Vec<(String, String)> {
        let encoded = serde_html_form::to_string(self)
            .inspect_err(|e| {
                #[cfg(feature = "tracing")]
                tracing::error!("Unable to convert to URL-encoded string {e:?}");
                #[cfg(not(feature = "tracing"))]
                let _: &serde_html_form::ser::Error = e;
            })
            .unwrap_or_default();

        url::form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect()
    }
}

impl<T: Serialize> ToQueryParams for T {}

/// Decodes a response body, treating an empty body (e.g. `204 No Content`) as JSON `null`.
fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(body)?)
}

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
async fn request(client: &reqwest::Client, request: Request) -> Result<Value> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(status_error(status_code, method, path, message));
    }

    let body = response.text().await?;
    parse_body(&body)
}

fn status_error(
    status_code: StatusCode,
    method: reqwest::Method,
    path: String,
    message: String,
) -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        status = %status_code,
        method = %method,
        path = %path,
        message = %message,
        "API request failed"
    );

    Error::status(status_code, method, path, message)
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Params {
        #[serde(skip_serializing_if = "Option::is_none")]
        per_page: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        include: Option<String>,
    }

    #[test]
    fn query_params_should_preserve_order() {
        let params = Params {
            per_page: Some(50),
            include: Some("egg,subusers".to_owned()),
        };

        assert_eq!(
            params.query_params(),
            vec![
                ("per_page".to_owned(), "50".to_owned()),
                ("include".to_owned(), "egg,subusers".to_owned()),
            ]
        );
    }

    #[test]
    fn query_params_should_be_empty_when_unset() {
        let params = Params {
            per_page: None,
            include: None,
        };

        assert!(params.query_params().is_empty());
    }

    #[test]
    fn unencodable_params_should_be_dropped() {
        #[derive(Serialize)]
        struct Nested {
            filter: Params,
        }

        let params = Nested {
            filter: Params {
                per_page: Some(10),
                include: None,
            },
        };

        assert!(params.query_params().is_empty());
    }

    #[test]
    fn empty_body_should_parse_as_null() {
        assert_eq!(parse_body("").unwrap(), Value::Null);
        assert_eq!(parse_body("  \n").unwrap(), Value::Null);
        assert_eq!(
            parse_body(r#"{"object":"list"}"#).unwrap(),
            serde_json::json!({ "object": "list" })
        );
    }

    #[test]
    fn malformed_body_should_fail() {
        let err = parse_body("<html>").unwrap_err();
        assert_eq!(err.kind(), error::Kind::Internal);
    }
}
