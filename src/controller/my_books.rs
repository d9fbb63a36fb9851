//! Owned books screen
//!
//! Lists the caller's books, toggles their archived and shareable flags and
//! saves new or edited books. A flag only changes locally after the server
//! confirmed the toggle.

use std::num::NonZeroU32;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::ClientError;
use crate::models::{BookId, BookRequest, BookResponse, CoverImage};
use crate::services::BookService;

use super::{FirstPageBehavior, Route};
use super::list::PageController;
use super::source::OwnedBookSource;

/// Which flag of a book to flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookToggle {
    Archived,
    Shareable,
}

impl BookToggle {
    fn flag(self, book: &mut BookResponse) -> &mut bool {
        match self {
            BookToggle::Archived => &mut book.archived,
            BookToggle::Shareable => &mut book.shareable,
        }
    }
}

pub struct MyBooks {
    list: PageController<BookResponse>,
    books: Arc<dyn BookService>,
}

impl MyBooks {
    pub fn new(books: Arc<dyn BookService>, size: NonZeroU32, first_page: FirstPageBehavior) -> Self {
        let source = Arc::new(OwnedBookSource::new(Arc::clone(&books)));
        Self {
            list: PageController::new(source, size).with_first_page_behavior(first_page),
            books,
        }
    }

    pub fn list(&self) -> &PageController<BookResponse> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut PageController<BookResponse> {
        &mut self.list
    }

    /// Flip one flag of a book and mirror the change on the current page.
    ///
    /// Returns the flag's new value, or `None` when the book is not on the page
    /// being shown. On failure nothing changes locally and the screen enters
    /// its error state.
    #[instrument(skip(self))]
    pub async fn toggle(
        &mut self,
        book_id: BookId,
        toggle: BookToggle,
    ) -> Result<Option<bool>, ClientError> {
        let result = match toggle {
            BookToggle::Archived => self.books.update_archived_status(book_id).await,
            BookToggle::Shareable => self.books.update_shareable_status(book_id).await,
        };

        if let Err(err) = result {
            warn!(error = %err, "Toggle rejected");
            self.list.state_mut().record_failure(err.reason());
            return Err(err);
        }

        let mut value = None;
        self.list.update_item(book_id, |book| {
            let flag = toggle.flag(book);
            *flag = !*flag;
            value = Some(*flag);
        });
        self.list.state_mut().clear_failure();
        info!(?value, "Toggle applied");
        Ok(value)
    }

    pub async fn toggle_archived(&mut self, book_id: BookId) -> Result<Option<bool>, ClientError> {
        self.toggle(book_id, BookToggle::Archived).await
    }

    pub async fn toggle_shareable(&mut self, book_id: BookId) -> Result<Option<bool>, ClientError> {
        self.toggle(book_id, BookToggle::Shareable).await
    }

    /// Edit form for a book on the current page.
    pub fn edit_request(&self, book_id: BookId) -> Option<BookRequest> {
        self.list
            .items()
            .iter()
            .find(|book| book.id == book_id)
            .map(BookRequest::from)
    }

    /// Save a new or edited book, upload its cover if one is given, then
    /// re-fetch the page so the saved book shows up.
    ///
    /// A failed cover upload is reported after the book itself was saved; the
    /// page is still refreshed.
    #[instrument(skip(self, request, cover), fields(book_id = request.id))]
    pub async fn save_book(
        &mut self,
        request: &BookRequest,
        cover: Option<CoverImage>,
    ) -> Result<BookId, ClientError> {
        let book_id = match self.books.save_book(request).await {
            Ok(book_id) => book_id,
            Err(err) => {
                warn!(error = %err, "Book was not saved");
                self.list.state_mut().record_failure(err.reason());
                return Err(err);
            }
        };
        info!(book_id, "Book saved");

        let uploaded = match cover {
            Some(cover) => self.books.upload_cover(book_id, cover).await,
            None => Ok(()),
        };
        let _ = self.list.fetch_page().await;

        if let Err(err) = uploaded {
            warn!(book_id, error = %err, "Cover upload failed");
            self.list.state_mut().record_failure(err.reason());
            return Err(err);
        }
        Ok(book_id)
    }

    /// Where editing a book happens.
    pub fn edit_target(&self, book_id: BookId) -> Route {
        Route::new(["books".to_string(), "manage".to_string(), book_id.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::state::{FetchOutcome, ViewState};
    use crate::controller::testing::FakeBookNetwork;
    use crate::error::FailureReason;

    fn screen(network: &Arc<FakeBookNetwork>) -> MyBooks {
        MyBooks::new(
            network.clone(),
            NonZeroU32::new(4).unwrap(),
            FirstPageBehavior::Refetch,
        )
    }

    fn archived_flags(screen: &MyBooks) -> Vec<bool> {
        screen.list().items().iter().map(|b| b.archived).collect()
    }

    #[tokio::test]
    async fn test_archive_flips_flag_once_without_refetch() {
        let network = Arc::new(FakeBookNetwork::with_owned(6));
        let mut screen = screen(&network);
        assert_eq!(screen.list_mut().initialize().await, FetchOutcome::Applied);
        let fetches = network.page_request_count();

        let value = screen.toggle_archived(2).await.unwrap();

        assert_eq!(value, Some(true));
        assert_eq!(archived_flags(&screen), vec![false, true, false, false]);
        assert_eq!(network.mutation_calls("archive"), vec![2]);
        assert_eq!(network.page_request_count(), fetches);
    }

    #[tokio::test]
    async fn test_failed_archive_leaves_flag_and_reports_error() {
        let network = Arc::new(FakeBookNetwork::with_owned(3));
        let mut screen = screen(&network);
        let _ = screen.list_mut().initialize().await;
        network.fail("archive");

        let result = screen.toggle_archived(1).await;

        assert!(matches!(result, Err(ClientError::Forbidden(_))));
        assert_eq!(archived_flags(&screen), vec![false, false, false]);
        assert!(matches!(
            screen.list().view(),
            ViewState::Error(FailureReason::Rejected { status: 403, .. })
        ));

        network.recover("archive");
        assert_eq!(screen.toggle_archived(1).await.unwrap(), Some(true));
        assert_eq!(screen.list().view(), &ViewState::Idle);
    }

    #[tokio::test]
    async fn test_share_toggle_flips_shareable() {
        let network = Arc::new(FakeBookNetwork::with_owned(2));
        let mut screen = screen(&network);
        let _ = screen.list_mut().initialize().await;

        assert_eq!(screen.toggle_shareable(1).await.unwrap(), Some(false));
        assert_eq!(screen.toggle_shareable(1).await.unwrap(), Some(true));
        assert_eq!(network.mutation_calls("share"), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_toggle_for_book_off_page() {
        let network = Arc::new(FakeBookNetwork::with_owned(6));
        let mut screen = screen(&network);
        let _ = screen.list_mut().initialize().await;

        assert_eq!(screen.toggle_archived(6).await.unwrap(), None);
        assert_eq!(network.mutation_calls("archive"), vec![6]);
    }

    #[test]
    fn test_edit_target_points_at_manage_screen() {
        let network = Arc::new(FakeBookNetwork::with_owned(1));
        let screen = MyBooks::new(network, NonZeroU32::new(4).unwrap(), FirstPageBehavior::Refetch);
        let route = screen.edit_target(42);
        assert_eq!(route.segments(), ["books", "manage", "42"]);
        assert_eq!(route.to_string(), "/books/manage/42");
    }

    fn new_book(title: &str) -> BookRequest {
        BookRequest {
            title: title.to_string(),
            author_name: "Author".to_string(),
            isbn: "isbn".to_string(),
            synopsis: "synopsis".to_string(),
            shareable: true,
            ..BookRequest::default()
        }
    }

    #[tokio::test]
    async fn test_save_new_book_refreshes_page() {
        let network = Arc::new(FakeBookNetwork::with_owned(2));
        let mut screen = screen(&network);
        let _ = screen.list_mut().initialize().await;

        let book_id = screen.save_book(&new_book("Fresh"), None).await.unwrap();

        assert_eq!(book_id, 3);
        assert_eq!(screen.list().items().len(), 3);
        assert_eq!(screen.list().items()[0].title.as_deref(), Some("Fresh"));
        assert!(network.mutation_calls("cover").is_empty());
    }

    #[tokio::test]
    async fn test_edit_request_round_trips_through_save() {
        let network = Arc::new(FakeBookNetwork::with_owned(2));
        let mut screen = screen(&network);
        let _ = screen.list_mut().initialize().await;

        let mut request = screen.edit_request(2).unwrap();
        assert_eq!(request.id, Some(2));
        request.title = "Renamed".to_string();
        request.author_name = "Author".to_string();
        request.isbn = "isbn".to_string();
        request.synopsis = "synopsis".to_string();

        let cover = CoverImage::new("front.png", vec![1, 2, 3]);
        assert_eq!(screen.save_book(&request, Some(cover)).await.unwrap(), 2);
        assert_eq!(network.mutation_calls("cover"), vec![2]);
        assert_eq!(screen.list().items()[1].title.as_deref(), Some("Renamed"));
        assert!(screen.edit_request(99).is_none());
    }

    #[tokio::test]
    async fn test_failed_save_enters_error_state() {
        let network = Arc::new(FakeBookNetwork::with_owned(1));
        let mut screen = screen(&network);
        let _ = screen.list_mut().initialize().await;
        network.fail("save");

        assert!(screen.save_book(&new_book("Nope"), None).await.is_err());
        assert!(matches!(screen.list().view(), ViewState::Error(_)));
        assert_eq!(screen.list().items().len(), 1);
    }

    #[tokio::test]
    async fn test_cover_failure_reported_after_save() {
        let network = Arc::new(FakeBookNetwork::with_owned(1));
        let mut screen = screen(&network);
        let _ = screen.list_mut().initialize().await;
        network.fail("cover");

        let cover = CoverImage::new("front.jpg", vec![0]);
        let result = screen.save_book(&new_book("Kept"), Some(cover)).await;

        assert!(result.is_err());
        assert_eq!(screen.list().items().len(), 2);
        assert!(matches!(screen.list().view(), ViewState::Error(_)));
    }
}
