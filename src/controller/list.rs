//! Paginated list controller
//!
//! One controller serves every paged screen; the collection it shows is chosen
//! by the [`PageSource`] it is built with.

use std::num::NonZeroU32;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::ClientError;
use crate::models::{BookId, Identified, PageResponse};

use super::FirstPageBehavior;
use super::cursor::PageCursor;
use super::source::PageSource;
use super::state::{FetchOutcome, FetchTicket, ListState, ViewState};

pub struct PageController<T: Send> {
    state: ListState<T>,
    source: Arc<dyn PageSource<T>>,
    first_page: FirstPageBehavior,
}

impl<T: Send> PageController<T> {
    pub fn new(source: Arc<dyn PageSource<T>>, size: NonZeroU32) -> Self {
        Self {
            state: ListState::new(PageCursor::new(size)),
            source,
            first_page: FirstPageBehavior::default(),
        }
    }

    pub fn with_first_page_behavior(mut self, behavior: FirstPageBehavior) -> Self {
        self.first_page = behavior;
        self
    }

    pub fn cursor(&self) -> PageCursor {
        self.state.cursor()
    }

    pub fn page(&self) -> Option<&PageResponse<T>> {
        self.state.page()
    }

    /// Items of the held page, empty before the first response.
    pub fn items(&self) -> &[T] {
        self.state
            .page()
            .map(|page| page.content.as_slice())
            .unwrap_or_default()
    }

    pub fn view(&self) -> &ViewState {
        self.state.view()
    }

    pub fn source(&self) -> Arc<dyn PageSource<T>> {
        Arc::clone(&self.source)
    }

    pub(crate) fn state_mut(&mut self) -> &mut ListState<T> {
        &mut self.state
    }

    /// `true` when the cursor sits on the last page of the latest response.
    pub fn is_last_page(&self) -> bool {
        self.state
            .page()
            .is_some_and(|page| self.state.cursor().index() >= page.last_index())
    }

    /// Fetch the first page.
    pub async fn initialize(&mut self) -> FetchOutcome {
        let cursor = self.state.cursor().with_index(0);
        self.state.navigate(cursor);
        self.fetch_page().await
    }

    /// Fetch the page under the cursor.
    #[instrument(skip(self), fields(page = self.state.cursor().index(), size = self.state.cursor().size().get()))]
    pub async fn fetch_page(&mut self) -> FetchOutcome {
        match self.fetch_once().await {
            // The cursor has been clamped to the real last page; show that one.
            FetchOutcome::OutOfRange => self.fetch_once().await,
            other => other,
        }
    }

    async fn fetch_once(&mut self) -> FetchOutcome {
        let ticket = self.state.begin_fetch();
        debug!(page = ticket.cursor().index(), "Fetching page");
        let result = self.source.fetch(ticket.request()).await;
        self.state.complete_fetch(ticket, result)
    }

    /// Move the cursor to `index` without fetching, clamped once the page
    /// count is known. Pair with [`Self::begin_fetch`] to drive fetches by hand.
    pub fn navigate(&mut self, index: u32) -> PageCursor {
        let cursor = self.state.cursor().with_index(index);
        self.state.navigate(cursor);
        self.state.cursor()
    }

    /// Issue a fetch whose result will be applied later by [`Self::complete_fetch`].
    ///
    /// Lets a driver run several requests concurrently; only the latest ticket's
    /// result is ever applied.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.state.begin_fetch()
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResponse<T>, ClientError>,
    ) -> FetchOutcome {
        self.state.complete_fetch(ticket, result)
    }

    pub async fn go_to_first_page(&mut self) -> FetchOutcome {
        let cursor = self.state.cursor().with_index(0);
        self.state.navigate(cursor);
        match self.first_page {
            FirstPageBehavior::Refetch => self.fetch_page().await,
            FirstPageBehavior::CursorOnly => FetchOutcome::Skipped,
        }
    }

    pub async fn go_to_previous_page(&mut self) -> FetchOutcome {
        let current = self.state.cursor();
        if current.index() == 0 && self.state.page().is_some() {
            return FetchOutcome::Skipped;
        }
        self.state.navigate(current.previous());
        self.fetch_page().await
    }

    pub async fn go_to_next_page(&mut self) -> FetchOutcome {
        if self.is_last_page() {
            return FetchOutcome::Skipped;
        }
        let next = self.state.cursor().next();
        self.state.navigate(next);
        self.fetch_page().await
    }

    /// Jump to `index`, clamped to the known page range.
    pub async fn go_to_page(&mut self, index: u32) -> FetchOutcome {
        self.navigate(index);
        self.fetch_page().await
    }

    /// Jump to the last page reported by the latest response.
    ///
    /// Without a previous response the first page is fetched to learn the page
    /// count before jumping.
    pub async fn go_to_last_page(&mut self) -> FetchOutcome {
        let mut just_fetched = false;
        if self.state.page().is_none() {
            let cursor = self.state.cursor().with_index(0);
            self.state.navigate(cursor);
            let outcome = self.fetch_page().await;
            if outcome != FetchOutcome::Applied {
                return outcome;
            }
            just_fetched = true;
        }

        let last = self
            .state
            .page()
            .map(|page| page.last_index())
            .unwrap_or_default();
        if just_fetched && self.state.cursor().index() == last {
            return FetchOutcome::Applied;
        }
        let cursor = self.state.cursor().with_index(last);
        self.state.navigate(cursor);
        self.fetch_page().await
    }
}

impl<T: Identified + Send> PageController<T> {
    /// Patch one item of the current page in place.
    pub fn update_item<F>(&mut self, book_id: BookId, update: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        self.state.update_item(book_id, update)
    }
}
