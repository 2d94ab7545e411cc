//! User-applet access entity.

use chrono::{DateTime, Utc};
use domain::models::AccessMeta;
use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `user_applet_accesses` table.
///
/// `role` is stored as text and parsed at the edge so unknown historical
/// values never fail row decoding.
#[derive(Debug, Clone, FromRow)]
pub struct AppletAccessEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub applet_id: Uuid,
    pub owner_id: Uuid,
    pub invitor_id: Option<Uuid>,
    pub role: String,
    pub meta: serde_json::Value,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

impl AppletAccessEntity {
    pub fn access_meta(&self) -> AccessMeta {
        serde_json::from_value(self.meta.clone()).unwrap_or_default()
    }
}
