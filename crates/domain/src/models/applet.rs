//! Applet domain models: requests, responses and the full snapshot shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::activity::{ActivityCreate, ActivityFull, ActivityResponse, ActivityUpdate};
use super::activity_flow::{FlowCreate, FlowFull, FlowResponse, FlowUpdate};
use super::language::LanguageMap;

/// End-to-end encryption parameters held by an applet.
///
/// The server stores these opaquely; answers are encrypted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Encryption {
    pub public_key: String,
    pub prime: String,
    pub base: String,
    pub account_id: String,
}

/// Report-server integration settings, updatable independently of content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ReportConfiguration {
    #[serde(default)]
    pub report_server_ip: Option<String>,

    #[serde(default)]
    pub report_public_key: Option<String>,

    #[serde(default)]
    pub report_recipients: Vec<String>,

    #[serde(default)]
    pub report_include_user_id: bool,

    #[serde(default)]
    pub report_include_case_id: bool,

    #[serde(default)]
    pub report_email_body: Option<String>,
}

/// Answer retention policy. `period` is ignored for `indefinitely`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionType {
    Indefinitely,
    Days,
    Weeks,
    Months,
    Years,
}

impl RetentionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionType::Indefinitely => "indefinitely",
            RetentionType::Days => "days",
            RetentionType::Weeks => "weeks",
            RetentionType::Months => "months",
            RetentionType::Years => "years",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RetentionRequest {
    pub retention: RetentionType,

    #[serde(default)]
    #[validate(range(min = 1, message = "Retention period must be positive"))]
    pub period: Option<i32>,
}

/// Request body for creating an applet with its full content tree.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateAppletRequest {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub display_name: String,

    #[serde(default)]
    pub description: LanguageMap,

    #[serde(default)]
    pub about: LanguageMap,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub watermark: Option<String>,

    #[serde(default)]
    pub theme_id: Option<Uuid>,

    pub encryption: Encryption,

    #[serde(default)]
    #[validate(nested)]
    pub report_configuration: Option<ReportConfiguration>,

    #[validate(length(min = 1, message = "At least one activity is required"))]
    #[validate(nested)]
    pub activities: Vec<ActivityCreate>,

    #[serde(default)]
    #[validate(nested)]
    pub activity_flows: Vec<FlowCreate>,
}

/// Request body for updating an applet; bumps the version.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateAppletRequest {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub display_name: String,

    #[serde(default)]
    pub description: LanguageMap,

    #[serde(default)]
    pub about: LanguageMap,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub watermark: Option<String>,

    #[serde(default)]
    pub theme_id: Option<Uuid>,

    #[serde(default)]
    pub encryption: Option<Encryption>,

    #[validate(length(min = 1, message = "At least one activity is required"))]
    #[validate(nested)]
    pub activities: Vec<ActivityUpdate>,

    #[serde(default)]
    #[validate(nested)]
    pub activity_flows: Vec<FlowUpdate>,
}

/// Request body for duplicating an applet under a new name.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct DuplicateAppletRequest {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub display_name: String,

    pub encryption: Encryption,
}

/// Request body for the unique-name lookup.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AppletNameRequest {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,

    #[serde(default)]
    pub exclude_applet_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AppletNameResponse {
    pub name: String,
}

/// Request body for creating an anonymous access link.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateAccessLinkRequest {
    /// When false the link admits unauthenticated respondents.
    pub require_login: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AppletLinkResponse {
    pub link: Uuid,
    pub require_login: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SetReportConfigurationRequest {
    #[validate(nested)]
    pub report_configuration: ReportConfiguration,
}

/// Single-language applet projection for list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AppletResponse {
    pub id: Uuid,
    pub display_name: String,
    pub version: String,
    pub description: String,
    pub about: String,
    pub image: Option<String>,
    pub watermark: Option<String>,
    pub theme_id: Option<Uuid>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single-language applet projection with the full content tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AppletDetailResponse {
    pub id: Uuid,
    pub display_name: String,
    pub version: String,
    pub description: String,
    pub about: String,
    pub image: Option<String>,
    pub watermark: Option<String>,
    pub theme_id: Option<Uuid>,
    pub link: Option<Uuid>,
    pub require_login: Option<bool>,
    pub encryption: Option<Encryption>,
    pub report_configuration: ReportConfiguration,
    pub retention_type: Option<String>,
    pub retention_period: Option<i32>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub activities: Vec<ActivityResponse>,
    pub activity_flows: Vec<FlowResponse>,
}

/// Complete applet state including all languages and the content tree.
///
/// This is the shape written to the version history snapshot column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppletFull {
    pub id: Uuid,
    pub display_name: String,
    pub version: String,
    pub description: LanguageMap,
    pub about: LanguageMap,
    pub image: Option<String>,
    pub watermark: Option<String>,
    pub theme_id: Option<Uuid>,
    pub encryption: Option<Encryption>,
    pub report_configuration: ReportConfiguration,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub activities: Vec<ActivityFull>,
    pub activity_flows: Vec<FlowFull>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::ActivityItemCreate;

    fn encryption() -> Encryption {
        Encryption {
            public_key: "pk".to_string(),
            prime: "prime".to_string(),
            base: "base".to_string(),
            account_id: "acct".to_string(),
        }
    }

    fn minimal_activity() -> ActivityCreate {
        serde_json::from_value(serde_json::json!({
            "name": "Check-in",
            "key": "550e8400-e29b-41d4-a716-446655440000",
            "items": [{
                "name": "mood",
                "question": {"en": "How are you?"},
                "response_type": "text"
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_create_request_requires_activity() {
        let request = CreateAppletRequest {
            display_name: "Sleep study".to_string(),
            description: LanguageMap::new(),
            about: LanguageMap::new(),
            image: None,
            watermark: None,
            theme_id: None,
            encryption: encryption(),
            report_configuration: None,
            activities: vec![],
            activity_flows: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_valid() {
        let request = CreateAppletRequest {
            display_name: "Sleep study".to_string(),
            description: [("en", "Nightly survey")].into_iter().collect(),
            about: LanguageMap::new(),
            image: None,
            watermark: None,
            theme_id: None,
            encryption: encryption(),
            report_configuration: None,
            activities: vec![minimal_activity()],
            activity_flows: vec![],
        };
        assert!(request.validate().is_ok());
        let _ = ActivityItemCreate {
            name: "mood".to_string(),
            question: LanguageMap::new(),
            response_type: "text".to_string(),
            response_values: None,
            config: serde_json::json!({}),
            is_hidden: false,
        };
    }

    #[test]
    fn test_retention_period_must_be_positive() {
        let request = RetentionRequest {
            retention: RetentionType::Days,
            period: Some(0),
        };
        assert!(request.validate().is_err());

        let request = RetentionRequest {
            retention: RetentionType::Indefinitely,
            period: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_retention_type_serde() {
        assert_eq!(
            serde_json::to_string(&RetentionType::Indefinitely).unwrap(),
            "\"indefinitely\""
        );
        let parsed: RetentionType = serde_json::from_str("\"weeks\"").unwrap();
        assert_eq!(parsed, RetentionType::Weeks);
        assert_eq!(RetentionType::Months.as_str(), "months");
    }

    #[test]
    fn test_applet_full_snapshot_roundtrip() {
        let full = AppletFull {
            id: Uuid::new_v4(),
            display_name: "Sleep study".to_string(),
            version: "2.1.0".to_string(),
            description: [("en", "Nightly survey")].into_iter().collect(),
            about: LanguageMap::new(),
            image: None,
            watermark: None,
            theme_id: None,
            encryption: Some(encryption()),
            report_configuration: ReportConfiguration::default(),
            is_published: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            activities: vec![],
            activity_flows: vec![],
        };
        let json = serde_json::to_value(&full).unwrap();
        let back: AppletFull = serde_json::from_value(json).unwrap();
        assert_eq!(back.version, "2.1.0");
        assert_eq!(back.description.resolve("en"), "Nightly survey");
    }
}
