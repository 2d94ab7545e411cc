//! Repository for answer database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::AnswerEntity;

/// Repository for answer operations.
#[derive(Clone)]
pub struct AnswerRepository {
    pool: PgPool,
}

impl AnswerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
        respondent_id: Uuid,
        activity_id: Option<Uuid>,
        flow_id: Option<Uuid>,
        answer: serde_json::Value,
        version: &str,
    ) -> Result<AnswerEntity, sqlx::Error> {
        sqlx::query_as::<_, AnswerEntity>(
            r#"
            INSERT INTO answers (applet_id, respondent_id, activity_id, flow_id, answer, version)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, applet_id, respondent_id, activity_id, flow_id, answer, version, created_at
            "#,
        )
        .bind(applet_id)
        .bind(respondent_id)
        .bind(activity_id)
        .bind(flow_id)
        .bind(answer)
        .bind(version)
        .fetch_one(conn)
        .await
    }

    /// Answers on an applet, newest first.
    pub async fn list_by_applet(
        &self,
        applet_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnswerEntity>, sqlx::Error> {
        sqlx::query_as::<_, AnswerEntity>(
            r#"
            SELECT id, applet_id, respondent_id, activity_id, flow_id, answer, version, created_at
            FROM answers
            WHERE applet_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(applet_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_by_applet(&self, applet_id: Uuid) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM answers WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    /// Removes every answer on an applet inside an open transaction.
    pub async fn delete_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM answers WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
