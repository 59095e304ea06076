//! Offset/limit pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Page size used when a caller passes a limit of zero.
pub const DEFAULT_LIMIT: u64 = 20;
/// Upper bound for caller supplied limits.
pub const MAX_LIMIT: u64 = 1000;

/// Pagination descriptor returned next to a page of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    /// Total number of rows matching the query.
    pub total_count: u64,
    /// Requested page size (the effective limit).
    pub page_size: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Current page number (1-based).
    pub current_page: u64,
    /// Number of rows actually returned on this page.
    pub current_page_size: u64,
    /// Offset the page starts at.
    pub offset: u64,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_previous: bool,
}

impl Paginator {
    /// Build a descriptor for a page starting at `offset` of `limit` rows.
    ///
    /// `current_page_size` starts at zero and is filled in once the rows
    /// have been fetched.
    pub fn new(limit: u64, offset: u64, total_count: u64) -> Self {
        let page_size = limit.max(1);
        let total_pages = if total_count == 0 {
            1
        } else {
            total_count.div_ceil(page_size)
        };
        let current_page = offset / page_size + 1;
        Self {
            total_count,
            page_size,
            total_pages,
            current_page,
            current_page_size: 0,
            offset,
            has_next: offset + page_size < total_count,
            has_previous: offset > 0,
        }
    }

    /// Record the number of rows on the fetched page.
    pub fn with_current_page_size(mut self, rows: usize) -> Self {
        self.current_page_size = rows as u64;
        self
    }
}

/// A page of rows together with its pagination descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Pagination descriptor.
    pub paginator: Paginator,
    /// The rows on this page.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page, recording the row count in the paginator.
    pub fn new(paginator: Paginator, items: Vec<T>) -> Self {
        Self {
            paginator: paginator.with_current_page_size(items.len()),
            items,
        }
    }

    /// Map the rows, keeping the descriptor.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            paginator: self.paginator,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let p = Paginator::new(20, 0, 45);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.current_page, 1);
        assert!(p.has_next);
        assert!(!p.has_previous);
    }

    #[test]
    fn test_last_page() {
        let p = Paginator::new(20, 40, 45);
        assert_eq!(p.current_page, 3);
        assert!(!p.has_next);
        assert!(p.has_previous);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let p = Paginator::new(20, 0, 0);
        assert_eq!(p.total_pages, 1);
        assert!(!p.has_next);
    }

    #[test]
    fn test_page_records_row_count() {
        let page = Page::new(Paginator::new(20, 0, 2), vec!["a", "b"]);
        assert_eq!(page.paginator.current_page_size, 2);
        let lengths = page.map(str::len);
        assert_eq!(lengths.items, vec![1, 1]);
    }
}
