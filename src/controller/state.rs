//! List state container
//!
//! All mutable state of a list screen lives in [`ListState`] and only changes
//! through its transition methods. Every fetch is tagged with a [`FetchTicket`];
//! a result is applied only if its ticket is the latest one issued, so a slow
//! response can never overwrite a newer page.

use metrics::counter;
use tracing::{debug, warn};

use crate::error::{ClientError, FailureReason};
use crate::models::{BookId, Identified, PageRequest, PageResponse};

use super::cursor::PageCursor;

/// What the screen is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Error(FailureReason),
}

/// Result of a fetch transition.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the held page.
    Applied,
    /// No request was issued (already at a boundary, or navigation deferred).
    Skipped,
    /// The server reported fewer pages than the requested index; the cursor
    /// was clamped and the held page left untouched.
    OutOfRange,
    /// A newer fetch was issued meanwhile; the response was discarded.
    Stale,
    Failed(FailureReason),
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    cursor: PageCursor,
}

impl FetchTicket {
    pub fn request(&self) -> PageRequest {
        self.cursor.request()
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }
}

#[derive(Debug)]
pub struct ListState<T> {
    cursor: PageCursor,
    page: Option<PageResponse<T>>,
    view: ViewState,
    issued: u64,
}

impl<T> ListState<T> {
    pub fn new(cursor: PageCursor) -> Self {
        Self {
            cursor,
            page: None,
            view: ViewState::Idle,
            issued: 0,
        }
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn page(&self) -> Option<&PageResponse<T>> {
        self.page.as_ref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Move the cursor. Once a page is known the index is kept within its bounds.
    pub fn navigate(&mut self, cursor: PageCursor) {
        self.cursor = match &self.page {
            Some(page) => cursor.clamped(page.last_index()),
            None => cursor,
        };
    }

    /// Issue a fetch for the current cursor.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.view = ViewState::Loading;
        FetchTicket {
            generation: self.issued,
            cursor: self.cursor,
        }
    }

    /// Apply the result of a fetch issued by [`ListState::begin_fetch`].
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResponse<T>, ClientError>,
    ) -> FetchOutcome {
        if ticket.generation != self.issued {
            debug!(
                page = ticket.cursor.index(),
                "Discarding response superseded by a newer fetch"
            );
            counter!("booknet_stale_responses_total").increment(1);
            return FetchOutcome::Stale;
        }

        match result {
            Err(err) => {
                warn!(page = ticket.cursor.index(), error = %err, "Page fetch failed");
                let reason = err.reason();
                self.view = ViewState::Error(reason.clone());
                FetchOutcome::Failed(reason)
            }
            Ok(response) if ticket.cursor.index() > response.last_index() => {
                debug!(
                    page = ticket.cursor.index(),
                    total_pages = response.total_pages,
                    "Requested page is past the end of the collection"
                );
                self.cursor = ticket.cursor.clamped(response.last_index());
                self.view = ViewState::Idle;
                FetchOutcome::OutOfRange
            }
            Ok(response) => {
                self.cursor = ticket.cursor.clamped(response.last_index());
                self.page = Some(response);
                self.view = ViewState::Idle;
                FetchOutcome::Applied
            }
        }
    }

    /// Put the screen into an error state outside of a fetch.
    pub fn record_failure(&mut self, reason: FailureReason) {
        self.view = ViewState::Error(reason);
    }

    pub fn clear_failure(&mut self) {
        if matches!(self.view, ViewState::Error(_)) {
            self.view = ViewState::Idle;
        }
    }
}

impl<T: Identified> ListState<T> {
    /// Patch one item of the held page in place. Returns whether it was found.
    pub fn update_item<F>(&mut self, book_id: BookId, update: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let item = self
            .page
            .as_mut()
            .and_then(|page| page.content.iter_mut().find(|item| item.id() == book_id));

        match item {
            Some(item) => {
                update(item);
                true
            }
            None => false,
        }
    }
}
