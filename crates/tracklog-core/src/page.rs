//! Pagination envelope

use serde::{Deserialize, Serialize};

/// One page of results plus the total match count.
///
/// `total` always reflects the filter predicate without LIMIT/OFFSET applied,
/// so `total >= items.len()` holds for every page, and an offset past the end
/// yields an empty `items` with an accurate `total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items for the current page
    pub items: Vec<T>,

    /// Total number of rows matching the filter (unpaged)
    pub total: i64,

    /// Page size that was applied
    pub limit: i64,

    /// Offset that was applied
    pub offset: i64,
}

impl<T> Page<T> {
    /// Create a page envelope
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    /// Whether more rows exist past this page
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total
    }

    /// Map the item type, keeping paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
