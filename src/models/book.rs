//! Book models
//!
//! Books as listed by their owner and as seen by a borrower.

use serde::{Deserialize, Serialize};

use super::{BookId, Identified};

/// A book as returned by the catalog and owner listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookResponse {
    pub id: BookId,
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub isbn: Option<String>,
    pub synopsis: Option<String>,
    pub owner: Option<String>,
    /// Base64 encoded cover image, opaque to the client.
    pub cover: Option<String>,
    pub rate: Option<f64>,
    pub archived: bool,
    pub shareable: bool,
}

impl BookResponse {
    /// Whether another member may borrow this book.
    pub fn is_borrowable(&self) -> bool {
        self.shareable && !self.archived
    }
}

impl Identified for BookResponse {
    fn id(&self) -> BookId {
        self.id
    }
}

/// A book the current member borrowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BorrowedBookResponse {
    pub id: BookId,
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub isbn: Option<String>,
    pub rate: Option<f64>,
    pub returned: bool,
    pub return_approved: bool,
}

impl BorrowedBookResponse {
    /// Feedback can be left while the book is still out on loan.
    pub fn accepts_feedback(&self) -> bool {
        !self.returned
    }
}

impl Identified for BorrowedBookResponse {
    fn id(&self) -> BookId {
        self.id
    }
}

/// Body of `POST /books`. Carrying an `id` updates that book instead of
/// creating a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<BookId>,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub synopsis: String,
    pub shareable: bool,
}

impl BookRequest {
    /// Names of the required fields left blank; the backend rejects those.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("authorName", &self.author_name),
            ("isbn", &self.isbn),
            ("synopsis", &self.synopsis),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl From<&BookResponse> for BookRequest {
    /// Pre-fill the edit form from a listed book.
    fn from(book: &BookResponse) -> Self {
        Self {
            id: Some(book.id),
            title: book.title.clone().unwrap_or_default(),
            author_name: book.author_name.clone().unwrap_or_default(),
            isbn: book.isbn.clone().unwrap_or_default(),
            synopsis: book.synopsis.clone().unwrap_or_default(),
            shareable: book.shareable,
        }
    }
}

/// Cover picture uploaded for a book.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CoverImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Media type guessed from the file extension.
    pub fn content_type(&self) -> &'static str {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}
