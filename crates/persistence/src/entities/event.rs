//! Schedule event entity.

use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `events` table.
///
/// Default events are the always-available schedule created for each
/// activity or flow when no explicit schedule exists.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub activity_id: Option<Uuid>,
    pub flow_id: Option<Uuid>,
    pub is_default: bool,
}
