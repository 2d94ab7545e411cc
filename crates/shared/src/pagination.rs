//! Offset pagination helpers for list endpoints.

use serde::{Deserialize, Serialize};

/// Default items per page.
pub const DEFAULT_PER_PAGE: i64 = 50;

/// Maximum items per page.
pub const MAX_PER_PAGE: i64 = 100;

/// Query parameters for paginated list endpoints.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct PageQuery {
    /// Page number (default: 1).
    pub page: Option<i64>,

    /// Items per page (default: 50, max: 100).
    pub per_page: Option<i64>,
}

impl PageQuery {
    /// Get the page number (1-indexed).
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get items per page (clamped to 1-100).
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Get the offset for the query.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// Pagination info returned alongside list results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = (total + per_page - 1) / per_page;
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), 50);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_page_query_with_values() {
        let query = PageQuery {
            page: Some(3),
            per_page: Some(25),
        };
        assert_eq!(query.page(), 3);
        assert_eq!(query.per_page(), 25);
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn test_page_query_clamping() {
        let query = PageQuery {
            page: Some(-5),
            per_page: Some(500),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), 100);
    }

    #[test]
    fn test_pagination_new() {
        let pagination = Pagination::new(2, 25, 75);
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.per_page, 25);
        assert_eq!(pagination.total, 75);
        assert_eq!(pagination.total_pages, 3);
    }

    #[test]
    fn test_pagination_rounds_up() {
        let pagination = Pagination::new(1, 10, 11);
        assert_eq!(pagination.total_pages, 2);
    }
}
