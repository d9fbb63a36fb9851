//! In-memory service doubles for screen tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{
    AuthenticationRequest, AuthenticationResponse, BookId, BookRequest, BookResponse,
    BorrowedBookResponse, CoverImage, FeedbackRequest, PageRequest, PageResponse, RegistrationRequest,
};
use crate::services::{AuthenticationService, BookService, FeedbackService};

/// Backend double holding a fixed library and recording every mutation.
#[derive(Default)]
pub(crate) struct FakeBookNetwork {
    pub owned: Mutex<Vec<BookResponse>>,
    pub borrowed: Mutex<Vec<BorrowedBookResponse>>,
    pub page_requests: Mutex<Vec<PageRequest>>,
    pub mutations: Mutex<Vec<(&'static str, BookId)>>,
    pub feedback: Mutex<Vec<FeedbackRequest>>,
    pub confirmed: Mutex<Vec<String>>,
    pub failing: Mutex<HashSet<&'static str>>,
    pub valid_codes: Vec<String>,
}

impl FakeBookNetwork {
    pub fn with_owned(count: BookId) -> Self {
        let owned = (1..=count)
            .map(|id| BookResponse {
                id,
                title: Some(format!("Owned {}", id)),
                shareable: true,
                ..BookResponse::default()
            })
            .collect();
        Self {
            owned: Mutex::new(owned),
            ..Self::default()
        }
    }

    pub fn with_borrowed(count: BookId) -> Self {
        let borrowed = (1..=count)
            .map(|id| BorrowedBookResponse {
                id,
                title: Some(format!("Borrowed {}", id)),
                ..BorrowedBookResponse::default()
            })
            .collect();
        Self {
            borrowed: Mutex::new(borrowed),
            ..Self::default()
        }
    }

    /// Make the named operation fail with a 403 until cleared.
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    pub fn mutation_calls(&self, operation: &str) -> Vec<BookId> {
        self.mutations
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| *op == operation)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn page_request_count(&self) -> usize {
        self.page_requests.lock().unwrap().len()
    }

    fn check(&self, operation: &'static str) -> Result<(), ClientError> {
        if self.failing.lock().unwrap().contains(operation) {
            Err(ClientError::Forbidden(format!("{} refused", operation)))
        } else {
            Ok(())
        }
    }

    fn mutate(&self, operation: &'static str, book_id: BookId) -> Result<BookId, ClientError> {
        self.mutations.lock().unwrap().push((operation, book_id));
        self.check(operation)?;
        Ok(book_id)
    }

    fn slice<T: Clone>(&self, items: &[T], page: PageRequest) -> PageResponse<T> {
        self.page_requests.lock().unwrap().push(page);
        let size = page.size.get() as usize;
        let total_pages = items.len().div_ceil(size) as u32;
        let content: Vec<T> = items
            .iter()
            .skip(page.page as usize * size)
            .take(size)
            .cloned()
            .collect();
        PageResponse {
            content,
            number: page.page,
            size: page.size.get(),
            total_elements: items.len() as u64,
            total_pages,
            first: page.page == 0,
            last: page.page + 1 >= total_pages,
        }
    }
}

#[async_trait]
impl BookService for FakeBookNetwork {
    async fn find_book(&self, book_id: BookId) -> Result<BookResponse, ClientError> {
        self.owned
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == book_id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }

    async fn save_book(&self, request: &BookRequest) -> Result<BookId, ClientError> {
        let mut owned = self.owned.lock().unwrap();
        let book_id = request
            .id
            .unwrap_or_else(|| owned.iter().map(|b| b.id).max().unwrap_or(0) + 1);
        self.mutations.lock().unwrap().push(("save", book_id));
        self.check("save")?;

        let book = BookResponse {
            id: book_id,
            title: Some(request.title.clone()),
            author_name: Some(request.author_name.clone()),
            isbn: Some(request.isbn.clone()),
            synopsis: Some(request.synopsis.clone()),
            shareable: request.shareable,
            ..BookResponse::default()
        };
        match owned.iter_mut().find(|b| b.id == book_id) {
            Some(existing) => *existing = book,
            None => owned.insert(0, book),
        }
        Ok(book_id)
    }

    async fn upload_cover(&self, book_id: BookId, _cover: CoverImage) -> Result<(), ClientError> {
        self.mutate("cover", book_id).map(|_| ())
    }

    async fn find_all_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BookResponse>, ClientError> {
        self.find_all_books_by_owner(page).await
    }

    async fn find_all_books_by_owner(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BookResponse>, ClientError> {
        self.check("list")?;
        let owned = self.owned.lock().unwrap().clone();
        Ok(self.slice(&owned, page))
    }

    async fn find_all_borrowed_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BorrowedBookResponse>, ClientError> {
        self.check("list")?;
        let borrowed = self.borrowed.lock().unwrap().clone();
        Ok(self.slice(&borrowed, page))
    }

    async fn find_all_returned_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BorrowedBookResponse>, ClientError> {
        self.find_all_borrowed_books(page).await
    }

    async fn update_archived_status(&self, book_id: BookId) -> Result<BookId, ClientError> {
        self.mutate("archive", book_id)
    }

    async fn update_shareable_status(&self, book_id: BookId) -> Result<BookId, ClientError> {
        self.mutate("share", book_id)
    }

    async fn borrow_book(&self, book_id: BookId) -> Result<i32, ClientError> {
        self.mutate("borrow", book_id)
    }

    async fn return_borrowed_book(&self, book_id: BookId) -> Result<i32, ClientError> {
        self.mutate("return", book_id)?;
        self.borrowed.lock().unwrap().retain(|b| b.id != book_id);
        Ok(book_id)
    }

    async fn approve_return(&self, book_id: BookId) -> Result<i32, ClientError> {
        self.mutate("approve", book_id)
    }
}

#[async_trait]
impl FeedbackService for FakeBookNetwork {
    async fn save_feedback(&self, request: &FeedbackRequest) -> Result<i32, ClientError> {
        self.feedback.lock().unwrap().push(request.clone());
        self.check("feedback")?;
        Ok(self.feedback.lock().unwrap().len() as i32)
    }
}

#[async_trait]
impl AuthenticationService for FakeBookNetwork {
    async fn confirm(&self, token: &str) -> Result<(), ClientError> {
        self.confirmed.lock().unwrap().push(token.to_string());
        if self.valid_codes.iter().any(|code| code == token) {
            Ok(())
        } else {
            Err(ClientError::Http {
                status: 400,
                body: Some("Activation token has expired".to_string()),
            })
        }
    }

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticationResponse, ClientError> {
        Ok(AuthenticationResponse {
            token: format!("token-for-{}", request.email),
        })
    }

    async fn register(&self, _request: &RegistrationRequest) -> Result<(), ClientError> {
        Ok(())
    }
}
