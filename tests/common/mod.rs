#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Deeply nested uses in sub-modules are falsely flagged as being unused"
)]

use httpmock::MockServer;
use serde_json::{Value, json};

pub const API_KEY: &str = "ptlc_0123456789abcdef";
pub const BEARER: &str = "Bearer ptlc_0123456789abcdef";

pub const SERVER_ID: &str = "1a7ce997";
pub const TOKEN: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.first";
pub const REFRESHED_TOKEN: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.second";

/// A server record as rendered by the client API.
#[must_use]
pub fn server(id: u64) -> Value {
    json!({
        "object": "server",
        "attributes": {
            "server_owner": true,
            "identifier": format!("{id:08x}"),
            "internal_id": id,
            "name": format!("server-{id}"),
            "node": "Node 1",
            "limits": { "memory": 1024, "swap": 0, "disk": 5120, "io": 500, "cpu": 200 }
        }
    })
}

/// A list response for `ids`, linking to `next` when given.
#[must_use]
pub fn page(ids: &[u64], current_page: u64, total: u64, next: Option<String>) -> Value {
    let links = match next {
        Some(next) => json!({ "next": next }),
        None => json!([]),
    };

    json!({
        "object": "list",
        "data": ids.iter().copied().map(server).collect::<Vec<_>>(),
        "meta": {
            "pagination": {
                "total": total,
                "count": ids.len(),
                "per_page": 2,
                "current_page": current_page,
                "total_pages": total.div_ceil(2),
                "links": links
            }
        }
    })
}

#[must_use]
pub fn next_link(server: &MockServer, endpoint: &str, page: u64) -> String {
    format!("{}/api/{endpoint}?page={page}", server.base_url())
}

#[must_use]
pub fn identifiers(items: &[Value]) -> Vec<u64> {
    items
        .iter()
        .map(|item| item["attributes"]["internal_id"].as_u64().unwrap())
        .collect()
}
