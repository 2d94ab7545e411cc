//! Repository for ownership transfer database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::TransferEntity;

/// Repository for transfer operations.
#[derive(Clone)]
pub struct TransferRepository {
    pool: PgPool,
}

impl TransferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        email: &str,
        applet_id: Uuid,
        key: Uuid,
        from_user_id: Uuid,
    ) -> Result<TransferEntity, sqlx::Error> {
        sqlx::query_as::<_, TransferEntity>(
            r#"
            INSERT INTO transfers (email, applet_id, key, from_user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, applet_id, key, from_user_id, created_at
            "#,
        )
        .bind(email)
        .bind(applet_id)
        .bind(key)
        .bind(from_user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Finds a transfer by its key, scoped to the applet in the URL.
    pub async fn find_by_key_and_applet(
        &self,
        key: Uuid,
        applet_id: Uuid,
    ) -> Result<Option<TransferEntity>, sqlx::Error> {
        sqlx::query_as::<_, TransferEntity>(
            r#"
            SELECT id, email, applet_id, key, from_user_id, created_at
            FROM transfers
            WHERE key = $1 AND applet_id = $2
            "#,
        )
        .bind(key)
        .bind(applet_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Deletes one declined transfer. Returns false when it was gone.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM transfers WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes every transfer on an applet inside an open transaction.
    pub async fn delete_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM transfers WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
