//! Repository for user-applet access grants and the role resolver.
//!
//! Priority resolution happens in SQL: access rows are ranked by a CASE
//! expression mirroring `Role::priority` and the minimum rank wins.
//! Capability checks are plain existence queries over role groups.

use domain::models::{AccessMeta, Role};
use sqlx::{PgConnection, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::entities::AppletAccessEntity;

const ACCESS_COLUMNS: &str =
    "id, user_id, applet_id, owner_id, invitor_id, role, meta, is_pinned, created_at";

const ROLE_RANK: &str = r#"CASE role
                WHEN 'owner' THEN 1
                WHEN 'manager' THEN 2
                WHEN 'coordinator' THEN 3
                WHEN 'editor' THEN 4
                WHEN 'reviewer' THEN 5
                WHEN 'respondent' THEN 6
                ELSE 10
            END"#;

/// Repository for access grant operations.
#[derive(Clone)]
pub struct AppletAccessRepository {
    pool: PgPool,
}

impl AppletAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grants a role inside an open transaction. A re-grant of an existing
    /// (user, applet, role) row refreshes its meta and invitor instead of
    /// violating the unique constraint.
    pub async fn add_role_tx(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        applet_id: Uuid,
        owner_id: Uuid,
        invitor_id: Option<Uuid>,
        role: Role,
        meta: &AccessMeta,
    ) -> Result<AppletAccessEntity, sqlx::Error> {
        sqlx::query_as::<_, AppletAccessEntity>(&format!(
            r#"
            INSERT INTO user_applet_accesses (user_id, applet_id, owner_id, invitor_id, role, meta)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, applet_id, role)
            DO UPDATE SET meta = EXCLUDED.meta, invitor_id = EXCLUDED.invitor_id,
                          owner_id = EXCLUDED.owner_id
            RETURNING {ACCESS_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(applet_id)
        .bind(owner_id)
        .bind(invitor_id)
        .bind(role.as_str())
        .bind(serde_json::to_value(meta).unwrap_or_default())
        .fetch_one(conn)
        .await
    }

    /// Highest-priority role the user holds on an applet.
    pub async fn applet_priority_role(
        &self,
        applet_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(&format!(
            r#"
            SELECT role
            FROM user_applet_accesses
            WHERE applet_id = $1 AND user_id = $2
            ORDER BY {ROLE_RANK}
            LIMIT 1
            "#
        ))
        .bind(applet_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|(role,)| Role::from_str(&role).ok()))
    }

    /// Highest-priority role the user holds anywhere in a workspace.
    pub async fn workspace_priority_role(
        &self,
        owner_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(&format!(
            r#"
            SELECT role
            FROM user_applet_accesses
            WHERE owner_id = $1 AND user_id = $2
            ORDER BY {ROLE_RANK}
            LIMIT 1
            "#
        ))
        .bind(owner_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|(role,)| Role::from_str(&role).ok()))
    }

    /// Whether the user holds any of the given roles on an applet.
    pub async fn has_any_role(
        &self,
        applet_id: Uuid,
        user_id: Uuid,
        roles: &[Role],
    ) -> Result<bool, sqlx::Error> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_applet_accesses
                WHERE applet_id = $1 AND user_id = $2 AND role = ANY($3)
            )
            "#,
        )
        .bind(applet_id)
        .bind(user_id)
        .bind(Role::names(roles))
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    pub async fn can_edit_applet(&self, applet_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        self.has_any_role(applet_id, user_id, Role::editors()).await
    }

    pub async fn can_invite(&self, applet_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        self.has_any_role(applet_id, user_id, Role::inviters()).await
    }

    pub async fn can_set_schedule(
        &self,
        applet_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        self.has_any_role(applet_id, user_id, Role::schedulers()).await
    }

    pub async fn can_see_data(&self, applet_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        self.has_any_role(applet_id, user_id, Role::reviewers()).await
    }

    pub async fn can_see_any_data(
        &self,
        applet_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        self.has_any_role(applet_id, user_id, Role::super_reviewers()).await
    }

    pub async fn can_set_retention(
        &self,
        applet_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        self.has_any_role(applet_id, user_id, Role::super_reviewers()).await
    }

    /// Owner of the applet, resolved from its owner access row.
    pub async fn get_applet_owner(&self, applet_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT user_id
            FROM user_applet_accesses
            WHERE applet_id = $1 AND role = 'owner'
            LIMIT 1
            "#,
        )
        .bind(applet_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Secret user ids already assigned to the applet's respondents.
    pub async fn respondent_secret_ids(&self, applet_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT meta->>'secret_user_id'
            FROM user_applet_accesses
            WHERE applet_id = $1 AND role = 'respondent'
              AND meta->>'secret_user_id' IS NOT NULL
            "#,
        )
        .bind(applet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Whether every given user holds Respondent access on the applet.
    pub async fn all_respondents(
        &self,
        applet_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<bool, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(true);
        }
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT user_id)
            FROM user_applet_accesses
            WHERE applet_id = $1 AND role = 'respondent' AND user_id = ANY($2)
            "#,
        )
        .bind(applet_id)
        .bind(user_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0 == user_ids.len() as i64)
    }

    /// All access rows on one applet, pinned rows first.
    pub async fn list_by_applet(&self, applet_id: Uuid) -> Result<Vec<AppletAccessEntity>, sqlx::Error> {
        sqlx::query_as::<_, AppletAccessEntity>(&format!(
            r#"
            SELECT {ACCESS_COLUMNS}
            FROM user_applet_accesses
            WHERE applet_id = $1
            ORDER BY is_pinned DESC, created_at
            "#
        ))
        .bind(applet_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Toggles the pin on a respondent access row within a workspace.
    /// Returns false when no such row exists under that owner.
    pub async fn toggle_pin(&self, owner_id: Uuid, access_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE user_applet_accesses
            SET is_pinned = NOT is_pinned
            WHERE id = $1 AND owner_id = $2 AND role = 'respondent'
            "#,
        )
        .bind(access_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes a user's manager-class roles on an applet, keeping any
    /// respondent grant. Returns the number of rows removed.
    pub async fn delete_manager_roles(
        &self,
        applet_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_applet_accesses
            WHERE applet_id = $1 AND user_id = $2 AND role = ANY($3)
            "#,
        )
        .bind(applet_id)
        .bind(user_id)
        .bind(Role::names(Role::managers()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Removes every access row on an applet inside an open transaction.
    pub async fn delete_all_by_applet_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_applet_accesses WHERE applet_id = $1
            "#,
        )
        .bind(applet_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::UNKNOWN_ROLE_PRIORITY;

    #[test]
    fn test_role_rank_matches_priorities() {
        // The SQL CASE must agree with Role::priority for every stored role.
        for role in [
            Role::Owner,
            Role::Manager,
            Role::Coordinator,
            Role::Editor,
            Role::Reviewer,
            Role::Respondent,
        ] {
            let clause = format!("WHEN '{}' THEN {}", role.as_str(), role.priority());
            assert!(
                ROLE_RANK.contains(&clause),
                "missing rank clause: {clause}"
            );
        }
        assert!(ROLE_RANK.contains(&format!("ELSE {UNKNOWN_ROLE_PRIORITY}")));
    }

    #[test]
    fn test_access_columns_cover_entity_fields() {
        for column in [
            "id",
            "user_id",
            "applet_id",
            "owner_id",
            "invitor_id",
            "role",
            "meta",
            "is_pinned",
            "created_at",
        ] {
            assert!(ACCESS_COLUMNS.contains(column), "missing column: {column}");
        }
    }
}
