//! Ownership transfer entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `transfers` table.
#[derive(Debug, Clone, FromRow)]
pub struct TransferEntity {
    pub id: Uuid,
    pub email: String,
    pub applet_id: Uuid,
    pub key: Uuid,
    pub from_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
