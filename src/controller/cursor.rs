//! Page cursor
//!
//! The `(index, size)` pair identifying which slice of a collection to request.
//! The index is unsigned, so a cursor can never point before the first page.

use std::num::NonZeroU32;

use crate::models::PageRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    index: u32,
    size: NonZeroU32,
}

impl PageCursor {
    /// Cursor on the first page.
    pub fn new(size: NonZeroU32) -> Self {
        Self { index: 0, size }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn size(&self) -> NonZeroU32 {
        self.size
    }

    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.index, self.size)
    }

    pub fn with_index(self, index: u32) -> Self {
        Self { index, ..self }
    }

    pub fn previous(self) -> Self {
        self.with_index(self.index.saturating_sub(1))
    }

    pub fn next(self) -> Self {
        self.with_index(self.index.saturating_add(1))
    }

    /// Pull the index back inside `[0, last_index]`.
    pub fn clamped(self, last_index: u32) -> Self {
        self.with_index(self.index.min(last_index))
    }
}
