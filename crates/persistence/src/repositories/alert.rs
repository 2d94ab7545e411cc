//! Repository for alert database operations.

use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::AlertEntity;

/// Alert row joined with applet and respondent context for listings.
#[derive(Debug, Clone, FromRow)]
pub struct AlertRow {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub applet_name: String,
    pub respondent_id: Uuid,
    pub secret_user_id: Option<String>,
    pub message: String,
    pub is_watched: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Repository for alert operations.
#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
        respondent_id: Uuid,
        activity_item_id: Option<Uuid>,
        message: &str,
    ) -> Result<AlertEntity, sqlx::Error> {
        sqlx::query_as::<_, AlertEntity>(
            r#"
            INSERT INTO alerts (applet_id, respondent_id, activity_item_id, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, applet_id, respondent_id, activity_item_id, message, is_watched, created_at
            "#,
        )
        .bind(applet_id)
        .bind(respondent_id)
        .bind(activity_item_id)
        .bind(message)
        .fetch_one(conn)
        .await
    }

    /// Alerts on applets where the user holds a reviewing role, newest
    /// first, with the respondent's secret id joined in.
    pub async fn list_for_reviewer(
        &self,
        user_id: Uuid,
        reviewer_roles: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertRow>, sqlx::Error> {
        sqlx::query_as::<_, AlertRow>(
            r#"
            SELECT al.id, al.applet_id, a.display_name AS applet_name, al.respondent_id,
                   resp.meta->>'secret_user_id' AS secret_user_id,
                   al.message, al.is_watched, al.created_at
            FROM alerts al
            JOIN applets a ON a.id = al.applet_id
            JOIN user_applet_accesses uaa
                 ON uaa.applet_id = al.applet_id AND uaa.user_id = $1 AND uaa.role = ANY($2)
            LEFT JOIN user_applet_accesses resp
                 ON resp.applet_id = al.applet_id AND resp.user_id = al.respondent_id
                 AND resp.role = 'respondent'
            WHERE NOT a.is_deleted
            ORDER BY al.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(reviewer_roles)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_for_reviewer(
        &self,
        user_id: Uuid,
        reviewer_roles: &[String],
    ) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM alerts al
            JOIN applets a ON a.id = al.applet_id
            JOIN user_applet_accesses uaa
                 ON uaa.applet_id = al.applet_id AND uaa.user_id = $1 AND uaa.role = ANY($2)
            WHERE NOT a.is_deleted
            "#,
        )
        .bind(user_id)
        .bind(reviewer_roles)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    /// Marks an alert watched when the user can review its applet.
    ///
    /// Returns false when the alert does not exist or the user lacks a
    /// reviewing role on it.
    pub async fn mark_watched(
        &self,
        alert_id: Uuid,
        user_id: Uuid,
        reviewer_roles: &[String],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE alerts
            SET is_watched = TRUE
            WHERE id = $1 AND applet_id IN (
                SELECT applet_id FROM user_applet_accesses
                WHERE user_id = $2 AND role = ANY($3)
            )
            "#,
        )
        .bind(alert_id)
        .bind(user_id)
        .bind(reviewer_roles)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes every alert on an applet inside an open transaction.
    pub async fn delete_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM alerts WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
