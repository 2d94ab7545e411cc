//! Invitation entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `invitations` table.
///
/// `role` and `status` are stored as text; parsing happens in the service
/// layer where an unknown value is a real error.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub email: String,
    pub applet_id: Uuid,
    pub role: String,
    pub key: Uuid,
    pub invitor_id: Uuid,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
