//! Answer submission models.
//!
//! Answers are stored as opaque client-encrypted payloads tagged with the
//! applet version they were submitted against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for submitting an answer.
///
/// Exactly one of `activity_id` / `flow_id` identifies what was answered;
/// both may be set when a flow step is submitted individually.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub activity_id: Option<Uuid>,

    #[serde(default)]
    pub flow_id: Option<Uuid>,

    /// Client-encrypted payload, opaque to the server.
    pub answer: serde_json::Value,

    #[validate(custom(function = "shared::validation::validate_version_string"))]
    pub version: String,

    /// Threshold alerts raised client-side while answering.
    #[serde(default)]
    #[validate(nested)]
    pub alerts: Vec<AnswerAlert>,
}

/// An alert raised for a single answered item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AnswerAlert {
    #[serde(default)]
    pub activity_item_id: Option<Uuid>,

    #[validate(length(min = 1, max = 500, message = "Alert message must be 1-500 characters"))]
    pub message: String,
}

/// A stored answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Answer {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub respondent_id: Uuid,
    pub activity_id: Option<Uuid>,
    pub flow_id: Option<Uuid>,
    pub answer: serde_json::Value,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_validation() {
        let request = SubmitAnswerRequest {
            activity_id: Some(Uuid::new_v4()),
            flow_id: None,
            answer: serde_json::json!({"cipher": "0a1b2c"}),
            version: "2.1.0".to_string(),
            alerts: vec![],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_alerts_default_empty() {
        let json = r#"{"answer": {}, "version": "1.0.0"}"#;
        let request: SubmitAnswerRequest = serde_json::from_str(json).unwrap();
        assert!(request.alerts.is_empty());
    }

    #[test]
    fn test_alert_message_required() {
        let request = SubmitAnswerRequest {
            activity_id: None,
            flow_id: None,
            answer: serde_json::json!({}),
            version: "1.0.0".to_string(),
            alerts: vec![AnswerAlert {
                activity_item_id: None,
                message: "".to_string(),
            }],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_submit_request_bad_version() {
        let request = SubmitAnswerRequest {
            activity_id: None,
            flow_id: None,
            answer: serde_json::json!({}),
            version: "v2".to_string(),
            alerts: vec![],
        };
        assert!(request.validate().is_err());
    }
}
