//! Repository for invitation database operations.
//!
//! Approve and decline are guarded updates with a pending-status
//! precondition; `rows_affected` distinguishes "already processed" from
//! success without a read-modify-write race.

use domain::models::{InvitationStatus, Role};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::InvitationEntity;

const INVITATION_COLUMNS: &str = r#"id, email, applet_id, role, key, invitor_id, status,
                   first_name, last_name, meta, created_at, updated_at"#;

/// Repository for invitation operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a pending invitation with a fresh key.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        email: &str,
        applet_id: Uuid,
        role: Role,
        key: Uuid,
        invitor_id: Uuid,
        first_name: &str,
        last_name: &str,
        meta: serde_json::Value,
    ) -> Result<InvitationEntity, sqlx::Error> {
        sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            INSERT INTO invitations (email, applet_id, role, key, invitor_id, status,
                                     first_name, last_name, meta)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(applet_id)
        .bind(role.as_str())
        .bind(key)
        .bind(invitor_id)
        .bind(first_name)
        .bind(last_name)
        .bind(meta)
        .fetch_one(&self.pool)
        .await
    }

    /// Finds an invitation by its acceptance key.
    pub async fn find_by_key(&self, key: Uuid) -> Result<Option<InvitationEntity>, sqlx::Error> {
        sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE key = $1
            "#
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
    }

    /// Pending invitation for the same (email, applet, role), if any.
    pub async fn find_pending_by_email_applet_role(
        &self,
        email: &str,
        applet_id: Uuid,
        role: Role,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE LOWER(email) = LOWER($1) AND applet_id = $2 AND role = $3
              AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(email)
        .bind(applet_id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
    }

    /// Whether an approved invitation for (email, applet, role) exists.
    pub async fn has_approved(
        &self,
        email: &str,
        applet_id: Uuid,
        role: Role,
    ) -> Result<bool, sqlx::Error> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM invitations
                WHERE LOWER(email) = LOWER($1) AND applet_id = $2 AND role = $3
                  AND status = 'approved'
            )
            "#,
        )
        .bind(email)
        .bind(applet_id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    /// Refreshes a pending invitation in place with a new key and payload.
    pub async fn refresh_pending(
        &self,
        id: Uuid,
        key: Uuid,
        invitor_id: Uuid,
        first_name: &str,
        last_name: &str,
        meta: serde_json::Value,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            UPDATE invitations
            SET key = $2, invitor_id = $3, first_name = $4, last_name = $5, meta = $6,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(key)
        .bind(invitor_id)
        .bind(first_name)
        .bind(last_name)
        .bind(meta)
        .fetch_optional(&self.pool)
        .await
    }

    /// Pending invitations sent by a user, newest first.
    pub async fn list_pending_by_invitor(
        &self,
        invitor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE invitor_id = $1 AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(invitor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_pending_by_invitor(&self, invitor_id: Uuid) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM invitations
            WHERE invitor_id = $1 AND status = 'pending'
            "#,
        )
        .bind(invitor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    /// Marks a pending invitation with a terminal status inside an open
    /// transaction. Returns false when it was already processed.
    pub async fn mark_processed_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: InvitationStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes every invitation on an applet inside an open transaction.
    pub async fn delete_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM invitations WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
