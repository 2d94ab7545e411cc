//! Repository for default schedule events.
//!
//! Every activity and flow gets one default event so it is always available
//! to respondents until an explicit schedule replaces it.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::EventEntity;

/// Repository for schedule event operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_default_for_activity_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
        activity_id: Uuid,
    ) -> Result<EventEntity, sqlx::Error> {
        sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (applet_id, activity_id, is_default)
            VALUES ($1, $2, TRUE)
            RETURNING id, applet_id, activity_id, flow_id, is_default
            "#,
        )
        .bind(applet_id)
        .bind(activity_id)
        .fetch_one(conn)
        .await
    }

    pub async fn insert_default_for_flow_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
        flow_id: Uuid,
    ) -> Result<EventEntity, sqlx::Error> {
        sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (applet_id, flow_id, is_default)
            VALUES ($1, $2, TRUE)
            RETURNING id, applet_id, activity_id, flow_id, is_default
            "#,
        )
        .bind(applet_id)
        .bind(flow_id)
        .fetch_one(conn)
        .await
    }

    /// Removes events bound to activities that no longer exist.
    pub async fn delete_by_activity_ids_tx(
        &self,
        conn: &mut PgConnection,
        activity_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM events WHERE activity_id = ANY($1)
            "#,
        )
        .bind(activity_ids)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Removes flow events of an applet. Flows get fresh ids on every
    /// content rebuild, so their old events are always stale.
    pub async fn delete_flow_events_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM events WHERE applet_id = $1 AND flow_id IS NOT NULL
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM events WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
