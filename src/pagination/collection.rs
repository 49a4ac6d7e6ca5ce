use async_stream::try_stream;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Meta, Page};
use super::cursor::{CursorState, PageCursor, Step};
use crate::Result;
use crate::executor::RequestExecutor;
use crate::serde_helpers::deserialize_with_warnings;

/// An async cursor over a paginated list endpoint.
///
/// Built from the first page of a list response, it yields that page first without a request and
/// then fetches `page = current_page + 1` from the same endpoint for as long as the held page
/// links to a next one. Once a page has no usable `links.next` the collection is exhausted for
/// good: advancing again returns `None` without touching the network.
///
/// A failed fetch is returned from [`advance`](Self::advance) and leaves the collection exactly
/// as it was, so the caller may retry.
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt as _;
/// use pterodactyl_client_sdk::Client;
/// use pterodactyl_client_sdk::types::ListRequest;
/// use tokio::pin;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("https://panel.example.com", "ptlc_key")?;
/// let mut servers = client.list_servers(&ListRequest::default()).await?;
///
/// println!("{:?} servers in total", servers.item_count());
///
/// let items = servers.items();
/// pin!(items);
/// while let Some(server) = items.next().await {
///     println!("{}", server?["attributes"]["name"]);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PaginatedCollection<E, T = Value> {
    executor: E,
    cursor: PageCursor<T>,
}

impl<E, T> PaginatedCollection<E, T> {
    /// Wraps `first_page`, already fetched from `endpoint`. The page is never requested again.
    pub fn new<S: Into<String>>(executor: E, endpoint: S, first_page: Page<T>) -> Self {
        Self {
            executor,
            cursor: PageCursor::new(endpoint.into(), first_page),
        }
    }

    /// Query parameters (e.g. `include`, `per_page`) to send with every following page.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.cursor.set_query(query);
        self
    }

    /// Item `index` of the page currently held. Never consults other pages.
    pub fn get(&self, index: usize) -> Result<&T> {
        self.cursor.get(index)
    }

    /// The page currently held.
    #[must_use]
    pub fn page(&self) -> &Page<T> {
        self.cursor.page()
    }

    /// Pagination metadata of the page currently held.
    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.cursor.page().meta
    }

    /// Page number of the page currently held.
    #[must_use]
    pub fn current_page(&self) -> u64 {
        self.cursor.current_page()
    }

    #[must_use]
    pub fn next_page_link(&self) -> Option<&str> {
        self.cursor.page().next_page_link()
    }

    #[must_use]
    pub fn previous_page_link(&self) -> Option<&str> {
        self.cursor.page().previous_page_link()
    }

    /// Total number of records across all pages as reported by the panel.
    #[must_use]
    pub fn item_count(&self) -> Option<u64> {
        self.cursor.item_count()
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        self.cursor.state()
    }

    /// Number of pages fetched so far, not counting the first page.
    #[must_use]
    pub fn page_requests(&self) -> u64 {
        self.cursor.page_requests()
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.cursor.endpoint()
    }

    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        self.cursor.query()
    }
}

impl<E: RequestExecutor, T: DeserializeOwned> PaginatedCollection<E, T> {
    /// Decodes a raw list response and wraps it as the first page.
    pub fn from_response<S: Into<String>>(executor: E, endpoint: S, response: Value) -> Result<Self> {
        let first_page: Page<T> = deserialize_with_warnings(response)?;
        Ok(Self::new(executor, endpoint, first_page))
    }

    /// Moves to the next page and returns it, or `None` at the end of the sequence.
    ///
    /// The first call returns the page the collection was built from.
    pub async fn advance(&mut self) -> Result<Option<&Page<T>>> {
        match self.cursor.step() {
            Step::Yield => {}
            Step::Done => return Ok(None),
            Step::Fetch { page, request } => {
                let response = self.executor.execute(request).await?;
                self.cursor.apply(page, response)?;
            }
        }

        Ok(Some(self.cursor.page()))
    }

    /// Stream of the pages still to come, fetched lazily one at a time.
    pub fn pages(&mut self) -> impl Stream<Item = Result<Page<T>>> + '_
    where
        T: Clone,
    {
        try_stream! {
            while let Some(page) = self.advance().await? {
                yield page.clone();
            }
        }
    }

    /// Stream of the items of every page still to come, in page order.
    pub fn items(&mut self) -> impl Stream<Item = Result<T>> + '_
    where
        T: Clone,
    {
        try_stream! {
            while let Some(page) = self.advance().await? {
                let items = page.data.clone();
                for item in items {
                    yield item;
                }
            }
        }
    }

    /// Drains the collection, concatenating the items of every page still to come.
    ///
    /// On a fresh collection this is every record behind the endpoint. Pages already yielded by
    /// [`advance`](Self::advance) are not revisited.
    pub async fn collect_all(&mut self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let mut collected = Vec::new();
        while let Some(page) = self.advance().await? {
            collected.extend_from_slice(&page.data);
        }

        Ok(collected)
    }
}
