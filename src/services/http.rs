//! REST implementation of the service traits.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{
    AuthenticationRequest, AuthenticationResponse, BookId, BookRequest, BookResponse,
    BorrowedBookResponse, CoverImage, FeedbackRequest, PageRequest, PageResponse, RegistrationRequest,
};

use super::{AuthenticationService, BookService, FeedbackService};

/// Book Network API reached over HTTP.
#[derive(Clone)]
pub struct HttpBookNetwork {
    api: ApiClient,
}

impl HttpBookNetwork {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    async fn page<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        page: PageRequest,
    ) -> Result<PageResponse<T>, ClientError> {
        let builder = self.api.request(Method::GET, path)?.query(&page.query());
        self.api.send_json(builder).await
    }

    async fn id_call(&self, method: Method, path: String) -> Result<i32, ClientError> {
        let builder = self.api.request(method, &path)?;
        self.api.send_json(builder).await
    }
}

#[async_trait]
impl BookService for HttpBookNetwork {
    #[instrument(skip(self))]
    async fn find_book(&self, book_id: BookId) -> Result<BookResponse, ClientError> {
        let builder = self
            .api
            .request(Method::GET, &format!("books/{}", book_id))?;
        self.api.send_json(builder).await
    }

    #[instrument(skip(self, request), fields(book_id = request.id))]
    async fn save_book(&self, request: &BookRequest) -> Result<BookId, ClientError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(ClientError::Validation(
                missing
                    .into_iter()
                    .map(|field| format!("{} is required", field))
                    .collect(),
            ));
        }

        let builder = self.api.request(Method::POST, "books")?.json(request);
        self.api.send_json(builder).await
    }

    #[instrument(skip(self, cover), fields(file_name = %cover.file_name, bytes = cover.bytes.len()))]
    async fn upload_cover(&self, book_id: BookId, cover: CoverImage) -> Result<(), ClientError> {
        let content_type = cover.content_type();
        let part = Part::bytes(cover.bytes)
            .file_name(cover.file_name)
            .mime_str(content_type)?;
        let builder = self
            .api
            .request(Method::POST, &format!("books/cover/{}", book_id))?
            .multipart(Form::new().part("file", part));
        self.api.send_empty(builder).await
    }

    #[instrument(skip(self))]
    async fn find_all_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BookResponse>, ClientError> {
        self.page("books", page).await
    }

    #[instrument(skip(self))]
    async fn find_all_books_by_owner(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BookResponse>, ClientError> {
        self.page("books/owner", page).await
    }

    #[instrument(skip(self))]
    async fn find_all_borrowed_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BorrowedBookResponse>, ClientError> {
        self.page("books/borrowed", page).await
    }

    #[instrument(skip(self))]
    async fn find_all_returned_books(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<BorrowedBookResponse>, ClientError> {
        self.page("books/returned", page).await
    }

    #[instrument(skip(self))]
    async fn update_archived_status(&self, book_id: BookId) -> Result<BookId, ClientError> {
        self.id_call(Method::PATCH, format!("books/archived/{}", book_id))
            .await
    }

    #[instrument(skip(self))]
    async fn update_shareable_status(&self, book_id: BookId) -> Result<BookId, ClientError> {
        self.id_call(Method::PATCH, format!("books/shareable/{}", book_id))
            .await
    }

    #[instrument(skip(self))]
    async fn borrow_book(&self, book_id: BookId) -> Result<i32, ClientError> {
        self.id_call(Method::POST, format!("books/borrow/{}", book_id))
            .await
    }

    #[instrument(skip(self))]
    async fn return_borrowed_book(&self, book_id: BookId) -> Result<i32, ClientError> {
        self.id_call(Method::PATCH, format!("books/borrow/return/{}", book_id))
            .await
    }

    #[instrument(skip(self))]
    async fn approve_return(&self, book_id: BookId) -> Result<i32, ClientError> {
        self.id_call(
            Method::PATCH,
            format!("books/borrow/return/approve/{}", book_id),
        )
        .await
    }
}

#[async_trait]
impl FeedbackService for HttpBookNetwork {
    #[instrument(skip(self, request), fields(book_id = request.book_id))]
    async fn save_feedback(&self, request: &FeedbackRequest) -> Result<i32, ClientError> {
        let builder = self.api.request(Method::POST, "feedbacks")?.json(request);
        self.api.send_json(builder).await
    }
}

#[async_trait]
impl AuthenticationService for HttpBookNetwork {
    #[instrument(skip_all)]
    async fn confirm(&self, token: &str) -> Result<(), ClientError> {
        let builder = self
            .api
            .request(Method::GET, "auth/activate-account")?
            .query(&[("token", token)]);
        self.api.send_empty(builder).await
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticationResponse, ClientError> {
        let builder = self
            .api
            .request(Method::POST, "auth/authenticate")?
            .json(request);
        let response: AuthenticationResponse = self.api.send_json(builder).await?;
        self.api.credentials().set(&response.token)?;
        tracing::info!("Authenticated");
        Ok(response)
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn register(&self, request: &RegistrationRequest) -> Result<(), ClientError> {
        let builder = self.api.request(Method::POST, "auth/register")?.json(request);
        self.api.send_empty(builder).await
    }
}
