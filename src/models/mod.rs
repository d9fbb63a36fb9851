//! # Data Models
//!
//! Wire types exchanged with the Book Network API.

pub mod auth;
pub mod book;
pub mod feedback;
pub mod page;

pub use auth::{AuthenticationRequest, AuthenticationResponse, RegistrationRequest};
pub use book::{BookRequest, BookResponse, BorrowedBookResponse, CoverImage};
pub use feedback::FeedbackRequest;
pub use page::{PageRequest, PageResponse};

/// Identifier of a book on the backend.
pub type BookId = i32;

/// Items that can be located by identifier inside a page.
pub trait Identified {
    fn id(&self) -> BookId;
}
