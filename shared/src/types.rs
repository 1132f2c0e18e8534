//! Common types used across the back-office

use serde::{Deserialize, Serialize};

/// Page size of the admin lists
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound accepted for `per_page`
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Build pagination parameters, clamping the page to at least 1 and the
    /// page size to `1..=MAX_PAGE_SIZE`
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: &Pagination, total_items: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(pagination, total_items),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let per_page = u64::from(pagination.per_page.max(1));
        let total_pages = total_items.div_ceil(per_page);
        Self {
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_size() {
        let pagination = Pagination::default();
        assert_eq!(pagination.per_page, 10);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn test_offset_and_clamping() {
        assert_eq!(Pagination::new(3, 10).offset(), 20);
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(1, 0).per_page, 1);
        assert_eq!(Pagination::new(1, 1000).per_page, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_total_pages() {
        let pagination = Pagination::new(1, 10);
        assert_eq!(PaginationMeta::new(&pagination, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(&pagination, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(&pagination, 11).total_pages, 2);
        assert_eq!(PaginationMeta::new(&pagination, 30).total_pages, 3);
    }

    #[test]
    fn test_navigation_flags() {
        let meta = PaginationMeta::new(&Pagination::new(2, 10), 25);
        assert!(meta.has_previous());
        assert!(meta.has_next());

        let last = PaginationMeta::new(&Pagination::new(3, 10), 25);
        assert!(!last.has_next());
    }
}
