//! Lazy, restartable cursors over the panel's paginated list endpoints.
//!
//! List endpoints answer with one page of records plus Laravel-style pagination metadata:
//!
//! ```json
//! { "object": "list",
//!   "data": [ ... ],
//!   "meta": { "pagination": { "total": 57, "count": 50, "per_page": 50,
//!                             "current_page": 1, "total_pages": 2,
//!                             "links": { "next": "https://panel.example.com/api/client?page=2" } } } }
//! ```
//!
//! A [`PaginatedCollection`] is built from the first such page and fetches further pages only
//! when it is advanced past the one it holds. [`blocking::PaginatedCollection`] offers the same
//! cursor with synchronous calls. Both drive the state machine in [`cursor`].

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod collection;
pub mod cursor;

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use self::collection::PaginatedCollection;
pub use self::cursor::CursorState;
use crate::serde_helpers::deserialize_links;

/// One fetched slice of a list endpoint.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Builder)]
pub struct Page<T = Value> {
    /// Always `list` for collections; kept so it is not reported as an unknown field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default = "Vec::new")]
    #[builder(default)]
    pub data: Vec<T>,
    #[serde(default)]
    #[builder(default)]
    pub meta: Meta,
}

impl<T> Page<T> {
    /// Items in this page, in server order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn pagination(&self) -> Option<&Pagination> {
        self.meta.pagination.as_ref()
    }

    #[must_use]
    pub fn next_page_link(&self) -> Option<&str> {
        self.pagination()?.links.next.as_deref()
    }

    #[must_use]
    pub fn previous_page_link(&self) -> Option<&str> {
        self.pagination()?.links.previous.as_deref()
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination block as reported upstream.
///
/// Every field is optional: the panel is the source of truth and the cursor tolerates missing or
/// inconsistent values (`count` in particular is never checked against `data.len()`).
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct Pagination {
    /// Number of records across all pages
    pub total: Option<u64>,
    /// Number of records on this page
    pub count: Option<u64>,
    pub per_page: Option<u64>,
    pub current_page: Option<u64>,
    pub total_pages: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_links")]
    #[builder(default)]
    pub links: Links,
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct Links {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// Whether `meta` links to a further page.
///
/// True iff `meta.pagination.links.next` is present and non-empty. A missing pagination block,
/// missing links, a `null` link and `""` all mean this is the last page.
#[must_use]
pub fn next_page_exists(meta: &Meta) -> bool {
    meta.pagination
        .as_ref()
        .and_then(|p| p.links.next.as_deref())
        .is_some_and(|next| !next.is_empty())
}
