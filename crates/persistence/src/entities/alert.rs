//! Alert entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `alerts` table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertEntity {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub respondent_id: Uuid,
    pub activity_item_id: Option<Uuid>,
    pub message: String,
    pub is_watched: bool,
    pub created_at: DateTime<Utc>,
}
