//! Activity flow entities.

use domain::models::LanguageMap;
use sqlx::FromRow;
use uuid::Uuid;

use super::applet::decode_language_map;

/// Row mapping for the `activity_flows` table.
#[derive(Debug, Clone, FromRow)]
pub struct FlowEntity {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub name: String,
    pub description: serde_json::Value,
    pub is_single_report: bool,
    pub hide_badge: bool,
    pub is_hidden: bool,
    pub ordering: i32,
}

impl FlowEntity {
    pub fn description_map(&self) -> LanguageMap {
        decode_language_map(&self.description)
    }
}

/// Row mapping for the `activity_flow_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct FlowItemEntity {
    pub id: Uuid,
    pub flow_id: Uuid,
    pub activity_id: Uuid,
    pub ordering: i32,
}
