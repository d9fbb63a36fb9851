//! Borrowed books screen
//!
//! Lists the books the caller borrowed and drives the return flow: select a
//! book, optionally fill in feedback, then return it.

use std::num::NonZeroU32;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::ClientError;
use crate::models::{BookId, BorrowedBookResponse, FeedbackRequest};
use crate::services::{BookService, FeedbackService};

use super::FirstPageBehavior;
use super::list::PageController;
use super::source::BorrowedBookSource;
use super::state::FetchOutcome;

/// Progress of the return flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnPhase {
    #[default]
    Idle,
    Selected,
    Returning,
}

/// What happened during a completed return.
#[derive(Debug)]
pub struct ReturnOutcome {
    pub book_id: BookId,
    /// Result of the feedback submission, when one was requested.
    pub feedback: Option<Result<i32, ClientError>>,
    /// Result of re-fetching the page after the return.
    pub refresh: FetchOutcome,
}

pub struct BorrowedBookList {
    list: PageController<BorrowedBookResponse>,
    books: Arc<dyn BookService>,
    feedback_service: Arc<dyn FeedbackService>,
    selected: Option<BorrowedBookResponse>,
    feedback: FeedbackRequest,
    phase: ReturnPhase,
}

impl BorrowedBookList {
    pub fn new(
        books: Arc<dyn BookService>,
        feedback_service: Arc<dyn FeedbackService>,
        size: NonZeroU32,
        first_page: FirstPageBehavior,
    ) -> Self {
        let source = Arc::new(BorrowedBookSource::new(Arc::clone(&books)));
        Self {
            list: PageController::new(source, size).with_first_page_behavior(first_page),
            books,
            feedback_service,
            selected: None,
            feedback: FeedbackRequest::default(),
            phase: ReturnPhase::Idle,
        }
    }

    pub fn list(&self) -> &PageController<BorrowedBookResponse> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut PageController<BorrowedBookResponse> {
        &mut self.list
    }

    pub fn selected(&self) -> Option<&BorrowedBookResponse> {
        self.selected.as_ref()
    }

    pub fn phase(&self) -> ReturnPhase {
        self.phase
    }

    pub fn feedback(&self) -> &FeedbackRequest {
        &self.feedback
    }

    /// The feedback form bound to the pending return.
    pub fn feedback_mut(&mut self) -> &mut FeedbackRequest {
        &mut self.feedback
    }

    /// Pick the book to return and point the feedback form at it.
    pub fn select_for_return(&mut self, book: &BorrowedBookResponse) {
        self.selected = Some(book.clone());
        self.feedback = FeedbackRequest::for_book(book.id);
        self.phase = ReturnPhase::Selected;
    }

    pub fn cancel_return(&mut self) {
        self.selected = None;
        self.feedback = FeedbackRequest::default();
        self.phase = ReturnPhase::Idle;
    }

    /// Return the selected book, submitting the feedback form first if asked.
    ///
    /// A feedback failure is reported in the outcome but does not undo the
    /// return. If the return itself fails the selection is kept so it can be
    /// retried.
    #[instrument(skip(self), fields(book_id = self.selected.as_ref().map(|b| b.id)))]
    pub async fn return_selected(
        &mut self,
        with_feedback: bool,
    ) -> Result<ReturnOutcome, ClientError> {
        let book_id = self
            .selected
            .as_ref()
            .map(|book| book.id)
            .ok_or(ClientError::NoSelection)?;

        self.phase = ReturnPhase::Returning;
        if let Err(err) = self.books.return_borrowed_book(book_id).await {
            warn!(error = %err, "Return rejected");
            self.phase = ReturnPhase::Selected;
            self.list.state_mut().record_failure(err.reason());
            return Err(err);
        }

        let feedback = if with_feedback {
            let result = self.feedback_service.save_feedback(&self.feedback).await;
            if let Err(err) = &result {
                warn!(error = %err, "Feedback could not be saved");
            }
            Some(result)
        } else {
            None
        };

        self.cancel_return();
        info!("Book returned");
        let refresh = self.list.fetch_page().await;

        Ok(ReturnOutcome {
            book_id,
            feedback,
            refresh,
        })
    }
}
