//! Service traits
//!
//! Async collaborators the screens talk to. [`HttpBookNetwork`] implements all of
//! them against the REST API; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{
    AuthenticationRequest, AuthenticationResponse, BookId, BookRequest, BookResponse,
    BorrowedBookResponse, CoverImage, FeedbackRequest, PageRequest, PageResponse, RegistrationRequest,
};

pub mod http;

pub use http::HttpBookNetwork;

/// Book catalog, ownership and lending operations.
#[async_trait]
pub trait BookService: Send + Sync {
    async fn find_book(&self, book_id: BookId) -> Result<BookResponse, ClientError>;

    /// Create a book owned by the caller, or update it when the request
    /// carries an id. The server answers with the book id.
    async fn save_book(&self, request: &BookRequest) -> Result<BookId, ClientError>;

    /// Replace the cover picture of one of the caller's books.
    async fn upload_cover(&self, book_id: BookId, cover: CoverImage) -> Result<(), ClientError>;

    /// Books other members share and that the caller may borrow.
    async fn find_all_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BookResponse>, ClientError>;

    /// Books owned by the caller.
    async fn find_all_books_by_owner(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BookResponse>, ClientError>;

    /// Books the caller currently borrows or borrowed.
    async fn find_all_borrowed_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BorrowedBookResponse>, ClientError>;

    /// The caller's books that were returned by their borrowers.
    async fn find_all_returned_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BorrowedBookResponse>, ClientError>;

    /// Flip the archived flag; the server answers with the book id.
    async fn update_archived_status(&self, book_id: BookId) -> Result<BookId, ClientError>;

    /// Flip the shareable flag; the server answers with the book id.
    async fn update_shareable_status(&self, book_id: BookId) -> Result<BookId, ClientError>;

    /// Borrow a book; the server answers with the transaction id.
    async fn borrow_book(&self, book_id: BookId) -> Result<i32, ClientError>;

    async fn return_borrowed_book(&self, book_id: BookId) -> Result<i32, ClientError>;

    /// Owner confirms a borrowed book came back.
    async fn approve_return(&self, book_id: BookId) -> Result<i32, ClientError>;
}

#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Store feedback; the server answers with the feedback id.
    async fn save_feedback(&self, request: &FeedbackRequest) -> Result<i32, ClientError>;
}

#[async_trait]
pub trait AuthenticationService: Send + Sync {
    /// Activate an account with the one-time code sent by email.
    async fn confirm(&self, token: &str) -> Result<(), ClientError>;

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticationResponse, ClientError>;

    async fn register(&self, request: &RegistrationRequest) -> Result<(), ClientError>;
}
