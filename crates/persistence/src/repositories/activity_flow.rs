//! Repository for activity flow database operations.

use domain::models::LanguageMap;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{FlowEntity, FlowItemEntity};

/// Column values for a flow insert.
#[derive(Debug, Clone)]
pub struct FlowWrite {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub name: String,
    pub description: LanguageMap,
    pub is_single_report: bool,
    pub hide_badge: bool,
    pub is_hidden: bool,
    pub ordering: i32,
}

/// Repository for activity flow operations.
#[derive(Clone)]
pub struct FlowRepository {
    pool: PgPool,
}

impl FlowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_tx(
        &self,
        conn: &mut PgConnection,
        write: &FlowWrite,
    ) -> Result<FlowEntity, sqlx::Error> {
        sqlx::query_as::<_, FlowEntity>(
            r#"
            INSERT INTO activity_flows (id, applet_id, name, description, is_single_report,
                                        hide_badge, is_hidden, ordering)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, applet_id, name, description, is_single_report,
                      hide_badge, is_hidden, ordering
            "#,
        )
        .bind(write.id)
        .bind(write.applet_id)
        .bind(&write.name)
        .bind(serde_json::to_value(&write.description).unwrap_or_default())
        .bind(write.is_single_report)
        .bind(write.hide_badge)
        .bind(write.is_hidden)
        .bind(write.ordering)
        .fetch_one(conn)
        .await
    }

    /// Inserts one flow item with its activity id already resolved.
    pub async fn insert_item_tx(
        &self,
        conn: &mut PgConnection,
        flow_id: Uuid,
        activity_id: Uuid,
        ordering: i32,
    ) -> Result<FlowItemEntity, sqlx::Error> {
        sqlx::query_as::<_, FlowItemEntity>(
            r#"
            INSERT INTO activity_flow_items (flow_id, activity_id, ordering)
            VALUES ($1, $2, $3)
            RETURNING id, flow_id, activity_id, ordering
            "#,
        )
        .bind(flow_id)
        .bind(activity_id)
        .bind(ordering)
        .fetch_one(conn)
        .await
    }

    /// Flows of an applet in display order.
    pub async fn list_by_applet(&self, applet_id: Uuid) -> Result<Vec<FlowEntity>, sqlx::Error> {
        sqlx::query_as::<_, FlowEntity>(
            r#"
            SELECT id, applet_id, name, description, is_single_report,
                   hide_badge, is_hidden, ordering
            FROM activity_flows
            WHERE applet_id = $1
            ORDER BY ordering
            "#,
        )
        .bind(applet_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Items of every flow in an applet, in display order.
    pub async fn list_items_by_applet(
        &self,
        applet_id: Uuid,
    ) -> Result<Vec<FlowItemEntity>, sqlx::Error> {
        sqlx::query_as::<_, FlowItemEntity>(
            r#"
            SELECT fi.id, fi.flow_id, fi.activity_id, fi.ordering
            FROM activity_flow_items fi
            JOIN activity_flows f ON f.id = fi.flow_id
            WHERE f.applet_id = $1
            ORDER BY f.ordering, fi.ordering
            "#,
        )
        .bind(applet_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Deletes all flow items of an applet. Flow items go first in the
    /// cascade order.
    pub async fn delete_items_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM activity_flow_items
            WHERE flow_id IN (SELECT id FROM activity_flows WHERE applet_id = $1)
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
            DELETE FROM activity_flows WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
