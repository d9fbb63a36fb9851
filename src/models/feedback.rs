use serde::{Deserialize, Serialize};

use super::BookId;

/// Feedback left on a book when it is returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub book_id: BookId,
    pub comment: String,
    /// Rating, from 0 to 5.
    pub note: f64,
}

impl FeedbackRequest {
    pub fn for_book(book_id: BookId) -> Self {
        Self {
            book_id,
            ..Self::default()
        }
    }
}
