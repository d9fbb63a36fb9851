//! # Screens
//!
//! State machines behind the book lending screens: the generic paginated list
//! controller, the owned-books and borrowed-books screens built on it, and the
//! account activation flow.

pub mod activation;
pub mod borrowed;
pub mod cursor;
pub mod list;
pub mod my_books;
pub mod source;
pub mod state;

#[cfg(test)]
mod testing;

pub use activation::{AccountActivation, ActivationStatus};
pub use borrowed::{BorrowedBookList, ReturnOutcome, ReturnPhase};
pub use cursor::PageCursor;
pub use list::PageController;
pub use my_books::{BookToggle, MyBooks};
pub use source::{BorrowedBookSource, CatalogSource, OwnedBookSource, PageSource, ReturnedBookSource};
pub use state::{FetchOutcome, FetchTicket, ListState, ViewState};

use std::fmt;

/// Whether "go to first page" fetches immediately or only moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstPageBehavior {
    #[default]
    Refetch,
    /// Move the cursor only; the page is fetched by the next navigation.
    CursorOnly,
}

/// Symbolic navigation target handed to whatever drives screen changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route(Vec<String>);

impl Route {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}
