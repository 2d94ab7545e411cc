//! Ownership transfer domain models.
//!
//! A transfer offers applet ownership to another user by email. The offer
//! is keyed by a generated UUID and stays open until accepted or declined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for initiating an ownership transfer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InitiateTransferRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Transfer offer as shown to the current owner after initiating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TransferResponse {
    pub key: Uuid,
    pub applet_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiate_requires_valid_email() {
        let request = InitiateTransferRequest {
            email: "new-owner@example.com".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = InitiateTransferRequest {
            email: "".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
