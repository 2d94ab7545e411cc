//! Answer entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `answers` table. The payload is client-encrypted
/// jsonb the server never inspects.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerEntity {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub respondent_id: Uuid,
    pub activity_id: Option<Uuid>,
    pub flow_id: Option<Uuid>,
    pub answer: serde_json::Value,
    pub version: String,
    pub created_at: DateTime<Utc>,
}
