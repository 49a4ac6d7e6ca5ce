//! The cursor state machine shared by the async and blocking collections.
//!
//! A collection asks [`PageCursor::step`] what to do next and either yields the page it holds,
//! performs the fetch it is told to, or stops. Nothing here touches the network, so both
//! execution models advance through exactly the same states.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Page, next_page_exists};
use crate::Result;
use crate::error::Error;
use crate::executor::ApiRequest;
use crate::serde_helpers::deserialize_with_warnings;

const PAGE_PARAM: &str = "page";

/// Where a collection is in its walk over the endpoint.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorState {
    /// Holding the page it was built from; nothing has been yielded yet
    #[default]
    NotStarted,
    /// At least one page has been yielded and more may follow
    Iterating,
    /// The last page was reached. Terminal: no further requests are made
    Exhausted,
}

/// What the owner of a [`PageCursor`] must do to advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// Yield the page already held
    Yield,
    /// Issue this request, then hand the response to [`PageCursor::apply`]
    Fetch { page: u64, request: ApiRequest },
    /// End of sequence
    Done,
}

/// Everything a collection owns apart from its executor.
#[derive(Debug, Clone)]
pub(crate) struct PageCursor<T> {
    endpoint: String,
    query: Vec<(String, String)>,
    page: Page<T>,
    state: CursorState,
    /// Page number of `page` as counted locally, used when the panel omits `current_page`
    position: u64,
    page_requests: u64,
}

impl<T> PageCursor<T> {
    pub(crate) fn new(endpoint: String, first_page: Page<T>) -> Self {
        let position = first_page
            .pagination()
            .and_then(|p| p.current_page)
            .unwrap_or(1);

        Self {
            endpoint,
            query: Vec::new(),
            page: first_page,
            state: CursorState::NotStarted,
            position,
            page_requests: 0,
        }
    }

    /// Replaces the caller query parameters merged into every page request. Any `page` key is
    /// dropped since the cursor owns it.
    pub(crate) fn set_query(&mut self, query: Vec<(String, String)>) {
        self.query = query
            .into_iter()
            .filter(|(key, _)| key != PAGE_PARAM)
            .collect();
    }

    pub(crate) fn step(&mut self) -> Step {
        match self.state {
            CursorState::NotStarted => {
                self.state = CursorState::Iterating;
                Step::Yield
            }
            CursorState::Iterating if next_page_exists(&self.page.meta) => {
                let page = self.next_page_number();
                Step::Fetch {
                    page,
                    request: self.request_for(page),
                }
            }
            CursorState::Iterating => {
                #[cfg(feature = "tracing")]
                tracing::debug!(endpoint = %self.endpoint, "pagination exhausted");
                self.state = CursorState::Exhausted;
                Step::Done
            }
            CursorState::Exhausted => Step::Done,
        }
    }

    fn next_page_number(&self) -> u64 {
        self.current_page().saturating_add(1)
    }

    fn request_for(&self, page: u64) -> ApiRequest {
        let mut query = self.query.clone();
        query.push((PAGE_PARAM.to_owned(), page.to_string()));
        ApiRequest::get(self.endpoint.clone(), query)
    }

    pub(crate) fn get(&self, index: usize) -> Result<&T> {
        self.page
            .data
            .get(index)
            .ok_or_else(|| Error::index_out_of_range(index, self.page.len()))
    }

    pub(crate) fn page(&self) -> &Page<T> {
        &self.page
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub(crate) fn state(&self) -> CursorState {
        self.state
    }

    /// Page number of the held page, as reported upstream or counted locally.
    pub(crate) fn current_page(&self) -> u64 {
        self.page
            .pagination()
            .and_then(|p| p.current_page)
            .unwrap_or(self.position)
    }

    pub(crate) fn page_requests(&self) -> u64 {
        self.page_requests
    }

    pub(crate) fn item_count(&self) -> Option<u64> {
        self.page.pagination().and_then(|p| p.total)
    }
}

impl<T: DeserializeOwned> PageCursor<T> {
    /// Replaces the held page with the response to a [`Step::Fetch`].
    ///
    /// A response that does not decode leaves the cursor untouched, exactly like a failed call.
    pub(crate) fn apply(&mut self, page: u64, response: Value) -> Result<()> {
        let next: Page<T> = deserialize_with_warnings(response)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = %self.endpoint,
            page,
            items = next.len(),
            "fetched page"
        );

        self.page = next;
        self.position = page;
        self.page_requests += 1;
        Ok(())
    }
}
