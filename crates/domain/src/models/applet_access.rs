//! User-to-applet access grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// Role-specific metadata stored alongside an access grant.
///
/// Respondent grants carry `secret_user_id` and `nickname`; reviewer grants
/// carry the list of respondent ids they may see. Other roles store an
/// empty object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub respondents: Vec<Uuid>,
}

impl AccessMeta {
    pub fn respondent(secret_user_id: impl Into<String>, nickname: Option<String>) -> Self {
        Self {
            secret_user_id: Some(secret_user_id.into()),
            nickname,
            respondents: Vec::new(),
        }
    }

    pub fn reviewer(respondents: Vec<Uuid>) -> Self {
        Self {
            secret_user_id: None,
            nickname: None,
            respondents,
        }
    }
}

/// A single (user, applet, role) access grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppletAccess {
    pub id: Uuid,
    pub user_id: Uuid,
    pub applet_id: Uuid,
    pub role: Role,
    pub owner_id: Uuid,
    pub invitor_id: Option<Uuid>,
    pub meta: AccessMeta,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respondent_meta_shape() {
        let meta = AccessMeta::respondent("secret-42", Some("Sam".to_string()));
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["secret_user_id"], "secret-42");
        assert_eq!(json["nickname"], "Sam");
        assert!(json.get("respondents").is_none());
    }

    #[test]
    fn test_reviewer_meta_shape() {
        let respondent = Uuid::new_v4();
        let meta = AccessMeta::reviewer(vec![respondent]);
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("secret_user_id").is_none());
        assert_eq!(json["respondents"][0], respondent.to_string());
    }

    #[test]
    fn test_empty_meta_is_empty_object() {
        let json = serde_json::to_value(AccessMeta::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
