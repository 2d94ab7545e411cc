//! Repository for activity and activity item database operations.

use domain::models::LanguageMap;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{ActivityEntity, ActivityItemEntity};

/// Column values for an activity insert.
#[derive(Debug, Clone)]
pub struct ActivityWrite {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub name: String,
    pub description: LanguageMap,
    pub splash_screen: Option<String>,
    pub image: Option<String>,
    pub show_all_at_once: bool,
    pub is_skippable: bool,
    pub is_reviewable: bool,
    pub response_is_editable: bool,
    pub is_hidden: bool,
    pub ordering: i32,
}

/// Column values for an activity item insert.
#[derive(Debug, Clone)]
pub struct ActivityItemWrite {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub name: String,
    pub question: LanguageMap,
    pub response_type: String,
    pub response_values: Option<serde_json::Value>,
    pub config: serde_json::Value,
    pub is_hidden: bool,
    pub ordering: i32,
}

/// Repository for activity operations.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts one activity inside an open transaction. Ids are assigned by
    /// the caller so flow items can reference them before commit.
    pub async fn insert_tx(
        &self,
        conn: &mut PgConnection,
        write: &ActivityWrite,
    ) -> Result<ActivityEntity, sqlx::Error> {
        sqlx::query_as::<_, ActivityEntity>(
            r#"
            INSERT INTO activities (id, applet_id, name, description, splash_screen, image,
                                    show_all_at_once, is_skippable, is_reviewable,
                                    response_is_editable, is_hidden, ordering)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, applet_id, name, description, splash_screen, image,
                      show_all_at_once, is_skippable, is_reviewable,
                      response_is_editable, is_hidden, ordering
            "#,
        )
        .bind(write.id)
        .bind(write.applet_id)
        .bind(&write.name)
        .bind(serde_json::to_value(&write.description).unwrap_or_default())
        .bind(&write.splash_screen)
        .bind(&write.image)
        .bind(write.show_all_at_once)
        .bind(write.is_skippable)
        .bind(write.is_reviewable)
        .bind(write.response_is_editable)
        .bind(write.is_hidden)
        .bind(write.ordering)
        .fetch_one(conn)
        .await
    }

    /// Inserts one activity item inside an open transaction.
    pub async fn insert_item_tx(
        &self,
        conn: &mut PgConnection,
        write: &ActivityItemWrite,
    ) -> Result<ActivityItemEntity, sqlx::Error> {
        sqlx::query_as::<_, ActivityItemEntity>(
            r#"
            INSERT INTO activity_items (id, activity_id, name, question, response_type,
                                        response_values, config, is_hidden, ordering)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, activity_id, name, question, response_type,
                      response_values, config, is_hidden, ordering
            "#,
        )
        .bind(write.id)
        .bind(write.activity_id)
        .bind(&write.name)
        .bind(serde_json::to_value(&write.question).unwrap_or_default())
        .bind(&write.response_type)
        .bind(&write.response_values)
        .bind(&write.config)
        .bind(write.is_hidden)
        .bind(write.ordering)
        .fetch_one(conn)
        .await
    }

    /// Activities of an applet in display order.
    pub async fn list_by_applet(&self, applet_id: Uuid) -> Result<Vec<ActivityEntity>, sqlx::Error> {
        sqlx::query_as::<_, ActivityEntity>(
            r#"
            SELECT id, applet_id, name, description, splash_screen, image,
                   show_all_at_once, is_skippable, is_reviewable,
                   response_is_editable, is_hidden, ordering
            FROM activities
            WHERE applet_id = $1
            ORDER BY ordering
            "#,
        )
        .bind(applet_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Items of every activity in an applet, in display order.
    pub async fn list_items_by_applet(
        &self,
        applet_id: Uuid,
    ) -> Result<Vec<ActivityItemEntity>, sqlx::Error> {
        sqlx::query_as::<_, ActivityItemEntity>(
            r#"
            SELECT ai.id, ai.activity_id, ai.name, ai.question, ai.response_type,
                   ai.response_values, ai.config, ai.is_hidden, ai.ordering
            FROM activity_items ai
            JOIN activities a ON a.id = ai.activity_id
            WHERE a.applet_id = $1
            ORDER BY a.ordering, ai.ordering
            "#,
        )
        .bind(applet_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Ids of an applet's current activities.
    pub async fn ids_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM activities WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Deletes all items of an applet's activities. Items go before their
    /// activities in the cascade order.
    pub async fn delete_items_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM activity_items
            WHERE activity_id IN (SELECT id FROM activities WHERE applet_id = $1)
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
            DELETE FROM activities WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
