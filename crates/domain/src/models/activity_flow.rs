//! Activity flow domain models.
//!
//! A flow is an ordered sequence of activities within an applet. Flow items
//! reference activities by the transient `activity_key` carried on the same
//! request, resolved to real activity ids when the applet is persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::language::LanguageMap;

/// Request payload for a flow inside an applet create request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct FlowCreate {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,

    #[serde(default)]
    pub description: LanguageMap,

    #[serde(default)]
    pub is_single_report: bool,

    #[serde(default)]
    pub hide_badge: bool,

    #[serde(default)]
    pub is_hidden: bool,

    #[validate(nested)]
    pub items: Vec<FlowItemCreate>,
}

/// Request payload for a flow inside an applet update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct FlowUpdate {
    #[serde(default)]
    pub id: Option<Uuid>,

    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,

    #[serde(default)]
    pub description: LanguageMap,

    #[serde(default)]
    pub is_single_report: bool,

    #[serde(default)]
    pub hide_badge: bool,

    #[serde(default)]
    pub is_hidden: bool,

    #[validate(nested)]
    pub items: Vec<FlowItemUpdate>,
}

/// A step in a flow, referencing an activity by its request key.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct FlowItemCreate {
    pub activity_key: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct FlowItemUpdate {
    #[serde(default)]
    pub id: Option<Uuid>,

    pub activity_key: Uuid,
}

/// Full flow state after persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FlowFull {
    pub id: Uuid,
    pub name: String,
    pub description: LanguageMap,
    pub is_single_report: bool,
    pub hide_badge: bool,
    pub is_hidden: bool,
    pub ordering: i32,
    pub items: Vec<FlowItemFull>,
}

/// Full flow item state with the resolved activity id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FlowItemFull {
    pub id: Uuid,
    pub activity_flow_id: Uuid,
    pub activity_id: Uuid,
    pub ordering: i32,
}

/// Single-language flow projection for list/detail responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FlowResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_single_report: bool,
    pub hide_badge: bool,
    pub is_hidden: bool,
    pub ordering: i32,
    pub activity_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_create_validation() {
        let flow = FlowCreate {
            name: "Daily routine".to_string(),
            description: [("en", "Morning and evening")].into_iter().collect(),
            is_single_report: false,
            hide_badge: false,
            is_hidden: false,
            items: vec![FlowItemCreate {
                activity_key: Uuid::new_v4(),
            }],
        };
        assert!(flow.validate().is_ok());
    }

    #[test]
    fn test_flow_name_too_long_rejected() {
        let flow = FlowCreate {
            name: "x".repeat(101),
            description: LanguageMap::new(),
            is_single_report: false,
            hide_badge: false,
            is_hidden: false,
            items: vec![],
        };
        assert!(flow.validate().is_err());
    }

    #[test]
    fn test_flow_update_defaults() {
        let json = r#"{"name": "Routine", "items": [{"activity_key": "550e8400-e29b-41d4-a716-446655440000"}]}"#;
        let flow: FlowUpdate = serde_json::from_str(json).unwrap();
        assert!(flow.id.is_none());
        assert!(!flow.is_single_report);
        assert!(flow.items[0].id.is_none());
    }
}
