//! Page sources
//!
//! A [`PageSource`] is the retrieval capability a [`super::PageController`] is
//! configured with. The adapters here bind one collection of [`BookService`]
//! to that capability.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{BookResponse, BorrowedBookResponse, PageRequest, PageResponse};
use crate::services::BookService;

#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    async fn fetch(&self, page: PageRequest) -> Result<PageResponse<T>, ClientError>;
}

macro_rules! book_source {
    ($(#[$doc:meta])* $name:ident, $item:ty, $method:ident) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            books: Arc<dyn BookService>,
        }

        impl $name {
            pub fn new(books: Arc<dyn BookService>) -> Self {
                Self { books }
            }
        }

        #[async_trait]
        impl PageSource<$item> for $name {
            async fn fetch(&self, page: PageRequest) -> Result<PageResponse<$item>, ClientError> {
                self.books.$method(page).await
            }
        }
    };
}

book_source!(
    /// Shareable books of other members.
    CatalogSource,
    BookResponse,
    find_all_books
);
book_source!(
    /// Books owned by the caller.
    OwnedBookSource,
    BookResponse,
    find_all_books_by_owner
);
book_source!(
    /// Books the caller borrowed.
    BorrowedBookSource,
    BorrowedBookResponse,
    find_all_borrowed_books
);
book_source!(
    /// The caller's books that came back from borrowers.
    ReturnedBookSource,
    BorrowedBookResponse,
    find_all_returned_books
);
