//! Activity and activity item entities.

use domain::models::LanguageMap;
use sqlx::FromRow;
use uuid::Uuid;

use super::applet::decode_language_map;

/// Row mapping for the `activities` table.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityEntity {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub name: String,
    pub description: serde_json::Value,
    pub splash_screen: Option<String>,
    pub image: Option<String>,
    pub show_all_at_once: bool,
    pub is_skippable: bool,
    pub is_reviewable: bool,
    pub response_is_editable: bool,
    pub is_hidden: bool,
    pub ordering: i32,
}

impl ActivityEntity {
    pub fn description_map(&self) -> LanguageMap {
        decode_language_map(&self.description)
    }
}

/// Row mapping for the `activity_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityItemEntity {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub name: String,
    pub question: serde_json::Value,
    pub response_type: String,
    pub response_values: Option<serde_json::Value>,
    pub config: serde_json::Value,
    pub is_hidden: bool,
    pub ordering: i32,
}

impl ActivityItemEntity {
    pub fn question_map(&self) -> LanguageMap {
        decode_language_map(&self.question)
    }
}
