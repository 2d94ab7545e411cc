//! Activity and activity item domain models.
//!
//! Activities are ordered collections of items (questions) within an
//! applet. On create/update requests each activity carries a transient
//! client-supplied `key` that flow items use to reference activities which
//! do not have a database-assigned id yet.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::language::LanguageMap;

/// Request payload for an activity inside an applet create request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ActivityCreate {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,

    /// Transient client-supplied key, never persisted as identity.
    pub key: Uuid,

    #[serde(default)]
    pub description: LanguageMap,

    #[serde(default)]
    pub splash_screen: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub show_all_at_once: bool,

    #[serde(default)]
    pub is_skippable: bool,

    #[serde(default)]
    pub is_reviewable: bool,

    #[serde(default = "default_true")]
    pub response_is_editable: bool,

    #[serde(default)]
    pub is_hidden: bool,

    #[validate(nested)]
    pub items: Vec<ActivityItemCreate>,
}

/// Request payload for an activity inside an applet update request.
///
/// An `id` marks the activity as pre-existing; activities without one are
/// created fresh.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ActivityUpdate {
    #[serde(default)]
    pub id: Option<Uuid>,

    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,

    pub key: Uuid,

    #[serde(default)]
    pub description: LanguageMap,

    #[serde(default)]
    pub splash_screen: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub show_all_at_once: bool,

    #[serde(default)]
    pub is_skippable: bool,

    #[serde(default)]
    pub is_reviewable: bool,

    #[serde(default = "default_true")]
    pub response_is_editable: bool,

    #[serde(default)]
    pub is_hidden: bool,

    #[validate(nested)]
    pub items: Vec<ActivityItemUpdate>,
}

/// Request payload for an item within an activity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ActivityItemCreate {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,

    pub question: LanguageMap,

    #[validate(length(min = 1, max = 50, message = "Response type must be 1-50 characters"))]
    pub response_type: String,

    #[serde(default)]
    pub response_values: Option<serde_json::Value>,

    #[serde(default = "default_config")]
    pub config: serde_json::Value,

    #[serde(default)]
    pub is_hidden: bool,
}

/// Item payload on update requests; an `id` marks a pre-existing item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ActivityItemUpdate {
    #[serde(default)]
    pub id: Option<Uuid>,

    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,

    pub question: LanguageMap,

    #[validate(length(min = 1, max = 50, message = "Response type must be 1-50 characters"))]
    pub response_type: String,

    #[serde(default)]
    pub response_values: Option<serde_json::Value>,

    #[serde(default = "default_config")]
    pub config: serde_json::Value,

    #[serde(default)]
    pub is_hidden: bool,
}

/// Full activity state: persisted fields plus the request key and items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityFull {
    pub id: Uuid,
    pub key: Uuid,
    pub name: String,
    pub description: LanguageMap,
    pub splash_screen: Option<String>,
    pub image: Option<String>,
    pub show_all_at_once: bool,
    pub is_skippable: bool,
    pub is_reviewable: bool,
    pub response_is_editable: bool,
    pub is_hidden: bool,
    pub ordering: i32,
    pub items: Vec<ActivityItemFull>,
}

/// Full activity item state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityItemFull {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub name: String,
    pub question: LanguageMap,
    pub response_type: String,
    pub response_values: Option<serde_json::Value>,
    pub config: serde_json::Value,
    pub is_hidden: bool,
    pub ordering: i32,
}

/// Single-language activity projection for list/detail responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub splash_screen: Option<String>,
    pub image: Option<String>,
    pub show_all_at_once: bool,
    pub is_skippable: bool,
    pub is_reviewable: bool,
    pub response_is_editable: bool,
    pub is_hidden: bool,
    pub ordering: i32,
    pub items: Vec<ActivityItemResponse>,
}

/// Single-language item projection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityItemResponse {
    pub id: Uuid,
    pub name: String,
    pub question: String,
    pub response_type: String,
    pub response_values: Option<serde_json::Value>,
    pub config: serde_json::Value,
    pub is_hidden: bool,
    pub ordering: i32,
}

fn default_true() -> bool {
    true
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> ActivityItemCreate {
        ActivityItemCreate {
            name: name.to_string(),
            question: [("en", "How are you?")].into_iter().collect(),
            response_type: "single_select".to_string(),
            response_values: None,
            config: default_config(),
            is_hidden: false,
        }
    }

    #[test]
    fn test_activity_create_validation() {
        let activity = ActivityCreate {
            name: "Morning check-in".to_string(),
            key: Uuid::new_v4(),
            description: LanguageMap::new(),
            splash_screen: None,
            image: None,
            show_all_at_once: false,
            is_skippable: false,
            is_reviewable: false,
            response_is_editable: true,
            is_hidden: false,
            items: vec![item("mood")],
        };
        assert!(activity.validate().is_ok());
    }

    #[test]
    fn test_activity_create_empty_name_rejected() {
        let activity = ActivityCreate {
            name: "".to_string(),
            key: Uuid::new_v4(),
            description: LanguageMap::new(),
            splash_screen: None,
            image: None,
            show_all_at_once: false,
            is_skippable: false,
            is_reviewable: false,
            response_is_editable: true,
            is_hidden: false,
            items: vec![],
        };
        assert!(activity.validate().is_err());
    }

    #[test]
    fn test_nested_item_validation() {
        let mut bad_item = item("mood");
        bad_item.response_type = "".to_string();
        let activity = ActivityCreate {
            name: "Check-in".to_string(),
            key: Uuid::new_v4(),
            description: LanguageMap::new(),
            splash_screen: None,
            image: None,
            show_all_at_once: false,
            is_skippable: false,
            is_reviewable: false,
            response_is_editable: true,
            is_hidden: false,
            items: vec![bad_item],
        };
        assert!(activity.validate().is_err());
    }

    #[test]
    fn test_response_is_editable_defaults_true() {
        let json = r#"{
            "name": "Check-in",
            "key": "550e8400-e29b-41d4-a716-446655440000",
            "items": []
        }"#;
        let activity: ActivityCreate = serde_json::from_str(json).unwrap();
        assert!(activity.response_is_editable);
        assert!(!activity.is_skippable);
    }
}
