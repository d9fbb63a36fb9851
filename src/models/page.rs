//! Page models
//!
//! The cursor sent to list endpoints and the page returned by them.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Query parameters of a paged list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: NonZeroU32,
}

impl PageRequest {
    pub fn new(page: u32, size: NonZeroU32) -> Self {
        Self { page, size }
    }

    /// Query pairs in the form the backend expects.
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ]
    }
}

/// One slice of a server-side collection plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> Default for PageResponse<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            number: 0,
            size: 0,
            total_elements: 0,
            total_pages: 0,
            first: true,
            last: true,
        }
    }
}

impl<T> PageResponse<T> {
    /// Highest valid page index for this collection.
    pub fn last_index(&self) -> u32 {
        self.total_pages.saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
