//! Synchronous variant of [`PaginatedCollection`](super::PaginatedCollection).
//!
//! Same cursor, same states, same requests. Each fetch blocks the calling thread.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Meta, Page};
use super::cursor::{CursorState, PageCursor, Step};
use crate::Result;
use crate::executor::BlockingRequestExecutor;
use crate::serde_helpers::deserialize_with_warnings;

/// A blocking cursor over a paginated list endpoint.
///
/// ```no_run
/// use pterodactyl_client_sdk::blocking::Client;
/// use pterodactyl_client_sdk::types::ListRequest;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("https://panel.example.com", "ptlc_key")?;
/// let mut servers = client.list_servers(&ListRequest::default())?;
///
/// for page in &mut servers {
///     for server in page?.items() {
///         println!("{}", server["attributes"]["identifier"]);
///     }
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
    pub fn new<S: Into<String>>(executor: E, endpoint: S, first_page: Page<T>) -> Self {
        Self {
            executor,
            cursor: PageCursor::new(endpoint.into(), first_page),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.cursor.set_query(query);
        self
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.cursor.get(index)
    }

    #[must_use]
    pub fn page(&self) -> &Page<T> {
        self.cursor.page()
    }

    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.cursor.page().meta
    }

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

    #[must_use]
    pub fn item_count(&self) -> Option<u64> {
        self.cursor.item_count()
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        self.cursor.state()
    }

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

impl<E: BlockingRequestExecutor, T: DeserializeOwned> PaginatedCollection<E, T> {
    pub fn from_response<S: Into<String>>(executor: E, endpoint: S, response: Value) -> Result<Self> {
        let first_page: Page<T> = deserialize_with_warnings(response)?;
        Ok(Self::new(executor, endpoint, first_page))
    }

    /// Moves to the next page and returns it, or `None` at the end of the sequence.
    pub fn advance(&mut self) -> Result<Option<&Page<T>>> {
        match self.cursor.step() {
            Step::Yield => {}
            Step::Done => return Ok(None),
            Step::Fetch { page, request } => {
                let response = self.executor.execute(request)?;
                self.cursor.apply(page, response)?;
            }
        }

        Ok(Some(self.cursor.page()))
    }

    /// Iterator over the pages still to come.
    ///
    /// The iterator ends after yielding the first error. The collection itself is left where the
    /// failed fetch found it, so a fresh call to `pages` retries that page.
    pub fn pages(&mut self) -> Pages<'_, E, T> {
        Pages {
            collection: self,
            failed: false,
        }
    }

    /// Iterator over the items of every page still to come, in page order.
    pub fn items(&mut self) -> impl Iterator<Item = Result<T>> + '_
    where
        T: Clone,
    {
        self.pages().flat_map(|page| match page {
            Ok(page) => page.data.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        })
    }

    /// Drains the collection, concatenating the items of every page still to come.
    pub fn collect_all(&mut self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let mut collected = Vec::new();
        while let Some(page) = self.advance()? {
            collected.extend_from_slice(&page.data);
        }

        Ok(collected)
    }
}

/// Iterator returned by [`PaginatedCollection::pages`].
#[derive(Debug)]
pub struct Pages<'coll, E, T> {
    collection: &'coll mut PaginatedCollection<E, T>,
    failed: bool,
}

impl<E: BlockingRequestExecutor, T: DeserializeOwned + Clone> Iterator for Pages<'_, E, T> {
    type Item = Result<Page<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.collection.advance() {
            Ok(page) => page.cloned().map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<'coll, E: BlockingRequestExecutor, T: DeserializeOwned + Clone> IntoIterator
    for &'coll mut PaginatedCollection<E, T>
{
    type Item = Result<Page<T>>;
    type IntoIter = Pages<'coll, E, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages()
    }
}
