//! Invitation domain models.
//!
//! Invitations are keyed by a generated UUID that doubles as the acceptance
//! token. Pending is the only state from which approve/decline succeeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::role::Role;

/// Lifecycle state of an invitation. Approved and declined are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Approved,
    Declined,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Approved => "approved",
            InvitationStatus::Declined => "declined",
        }
    }
}

/// Request body for inviting a respondent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InviteRespondentRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(custom(function = "shared::validation::validate_language_code"))]
    pub language: String,

    #[validate(custom(function = "shared::validation::validate_secret_user_id"))]
    pub secret_user_id: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Nickname must be at most 100 characters"))]
    pub nickname: Option<String>,
}

/// Request body for inviting a reviewer scoped to specific respondents.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InviteReviewerRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(custom(function = "shared::validation::validate_language_code"))]
    pub language: String,

    #[serde(default)]
    pub respondents: Vec<Uuid>,
}

/// Request body for inviting a manager, coordinator or editor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InviteManagersRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(custom(function = "shared::validation::validate_language_code"))]
    pub language: String,

    pub role: Role,
}

/// Invitation as shown to its invitee or invitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationResponse {
    pub id: Uuid,
    pub key: Uuid,
    pub email: String,
    pub applet_id: Uuid,
    pub applet_name: String,
    pub role: Role,
    pub status: InvitationStatus,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&InvitationStatus::Pending).unwrap(),
            "\"pending\""
        );
        let parsed: InvitationStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(parsed, InvitationStatus::Approved);
    }

    #[test]
    fn test_respondent_request_validation() {
        let request = InviteRespondentRequest {
            email: "sam@example.com".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Jones".to_string(),
            language: "en".to_string(),
            secret_user_id: "secret-42".to_string(),
            nickname: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_respondent_request_bad_email() {
        let request = InviteRespondentRequest {
            email: "not-an-email".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Jones".to_string(),
            language: "en".to_string(),
            secret_user_id: "secret-42".to_string(),
            nickname: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_respondent_request_bad_language() {
        let request = InviteRespondentRequest {
            email: "sam@example.com".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Jones".to_string(),
            language: "english".to_string(),
            secret_user_id: "secret-42".to_string(),
            nickname: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_managers_request_parses_role() {
        let json = r#"{
            "email": "eve@example.com",
            "first_name": "Eve",
            "last_name": "Stone",
            "language": "en",
            "role": "coordinator"
        }"#;
        let request: InviteManagersRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.role, Role::Coordinator);
        assert!(request.validate().is_ok());
    }
}
