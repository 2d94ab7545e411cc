//! HTTP route handlers.

pub mod alerts;
pub mod answers;
pub mod applets;
pub mod health;
pub mod invitations;
pub mod transfers;
pub mod workspaces;

use serde::Serialize;
use shared::pagination::Pagination;

/// Envelope for paginated list responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListResponse<T> {
    pub result: Vec<T>,
    pub pagination: Pagination,
}

impl<T> ListResponse<T> {
    pub fn new(result: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        Self {
            result,
            pagination: Pagination::new(page, per_page, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_shape() {
        let response = ListResponse::new(vec![1, 2, 3], 1, 50, 3);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["pagination"]["total_pages"], 1);
    }
}
