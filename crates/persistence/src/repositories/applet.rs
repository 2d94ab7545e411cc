//! Repository for applet database operations.

use domain::models::{Encryption, LanguageMap, ReportConfiguration};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::AppletEntity;

const APPLET_COLUMNS: &str = r#"id, display_name, description, about, image, watermark, theme_id,
                   version, report_server_ip, report_public_key, report_recipients,
                   report_include_user_id, report_include_case_id, report_email_body,
                   encryption, link, require_login, retention_period, retention_type,
                   is_published, is_deleted, created_at, updated_at"#;

/// Column values shared between insert and update.
#[derive(Debug, Clone)]
pub struct AppletWrite {
    pub display_name: String,
    pub description: LanguageMap,
    pub about: LanguageMap,
    pub image: Option<String>,
    pub watermark: Option<String>,
    pub theme_id: Option<Uuid>,
    pub version: String,
    pub encryption: Option<Encryption>,
    pub report_configuration: ReportConfiguration,
}

/// Repository for applet operations.
#[derive(Clone)]
pub struct AppletRepository {
    pool: PgPool,
}

impl AppletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new applet row inside an open transaction.
    pub async fn insert_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        write: &AppletWrite,
    ) -> Result<AppletEntity, sqlx::Error> {
        let encryption = write
            .encryption
            .as_ref()
            .map(|e| serde_json::to_value(e).unwrap_or_default());
        let recipients =
            serde_json::to_value(&write.report_configuration.report_recipients).unwrap_or_default();
        sqlx::query_as::<_, AppletEntity>(&format!(
            r#"
            INSERT INTO applets (id, display_name, description, about, image, watermark, theme_id,
                                 version, report_server_ip, report_public_key, report_recipients,
                                 report_include_user_id, report_include_case_id, report_email_body,
                                 encryption)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {APPLET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&write.display_name)
        .bind(serde_json::to_value(&write.description).unwrap_or_default())
        .bind(serde_json::to_value(&write.about).unwrap_or_default())
        .bind(&write.image)
        .bind(&write.watermark)
        .bind(write.theme_id)
        .bind(&write.version)
        .bind(&write.report_configuration.report_server_ip)
        .bind(&write.report_configuration.report_public_key)
        .bind(recipients)
        .bind(write.report_configuration.report_include_user_id)
        .bind(write.report_configuration.report_include_case_id)
        .bind(&write.report_configuration.report_email_body)
        .bind(encryption)
        .fetch_one(conn)
        .await
    }

    /// Rewrites an applet's own columns inside an open transaction.
    pub async fn update_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        write: &AppletWrite,
    ) -> Result<AppletEntity, sqlx::Error> {
        let encryption = write
            .encryption
            .as_ref()
            .map(|e| serde_json::to_value(e).unwrap_or_default());
        sqlx::query_as::<_, AppletEntity>(&format!(
            r#"
            UPDATE applets
            SET display_name = $2, description = $3, about = $4, image = $5, watermark = $6,
                theme_id = $7, version = $8, encryption = COALESCE($9, encryption),
                updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING {APPLET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&write.display_name)
        .bind(serde_json::to_value(&write.description).unwrap_or_default())
        .bind(serde_json::to_value(&write.about).unwrap_or_default())
        .bind(&write.image)
        .bind(&write.watermark)
        .bind(write.theme_id)
        .bind(&write.version)
        .bind(encryption)
        .fetch_one(conn)
        .await
    }

    /// Finds a live applet by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AppletEntity>, sqlx::Error> {
        sqlx::query_as::<_, AppletEntity>(&format!(
            r#"
            SELECT {APPLET_COLUMNS}
            FROM applets
            WHERE id = $1 AND NOT is_deleted
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Public lookup of a live applet by its access link key.
    pub async fn find_by_link(&self, link: Uuid) -> Result<Option<AppletEntity>, sqlx::Error> {
        sqlx::query_as::<_, AppletEntity>(&format!(
            r#"
            SELECT {APPLET_COLUMNS}
            FROM applets
            WHERE link = $1 AND NOT is_deleted
            "#
        ))
        .bind(link)
        .fetch_optional(&self.pool)
        .await
    }

    /// Live applets the user can access, newest first. Multiple access
    /// rows on one applet must not produce duplicate entries.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AppletEntity>, sqlx::Error> {
        sqlx::query_as::<_, AppletEntity>(&list_for_user_sql())
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn count_for_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT a.id)
            FROM applets a
            JOIN user_applet_accesses uaa ON uaa.applet_id = a.id
            WHERE uaa.user_id = $1 AND NOT a.is_deleted
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    /// Live applets in a workspace (grouped by owner) the user can access,
    /// newest first.
    pub async fn list_in_workspace(
        &self,
        owner_id: Uuid,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AppletEntity>, sqlx::Error> {
        sqlx::query_as::<_, AppletEntity>(&list_in_workspace_sql())
            .bind(owner_id)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Display names colliding with `base` or `base (N)` among the user's
    /// accessible live applets, matched case-insensitively.
    pub async fn name_duplicates(
        &self,
        user_id: Uuid,
        base: &str,
        exclude_applet_id: Option<Uuid>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let lowered = base.trim().to_lowercase();
        let pattern = format!(r"^{} \(\d+\)$", regex::escape(&lowered));
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT a.display_name
            FROM applets a
            JOIN user_applet_accesses uaa ON uaa.applet_id = a.id
            WHERE uaa.user_id = $1 AND NOT a.is_deleted
              AND (LOWER(a.display_name) ~ $2 OR LOWER(a.display_name) = $3)
              AND ($4::uuid IS NULL OR a.id <> $4)
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&lowered)
        .bind(exclude_applet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Creates the access link; fails when one already exists.
    ///
    /// Returns false if a link is already set.
    pub async fn create_link(
        &self,
        id: Uuid,
        link: Uuid,
        require_login: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE applets
            SET link = $2, require_login = $3, updated_at = NOW()
            WHERE id = $1 AND link IS NULL AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(link)
        .bind(require_login)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes the access link. Returns false when none was set.
    pub async fn delete_link(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE applets
            SET link = NULL, require_login = NULL, updated_at = NOW()
            WHERE id = $1 AND link IS NOT NULL AND NOT is_deleted
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_retention(
        &self,
        id: Uuid,
        retention_type: &str,
        period: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE applets
            SET retention_type = $2, retention_period = $3, updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(retention_type)
        .bind(period)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_published(&self, id: Uuid, is_published: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE applets
            SET is_published = $2, updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(is_published)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_report_configuration(
        &self,
        id: Uuid,
        config: &ReportConfiguration,
    ) -> Result<bool, sqlx::Error> {
        let recipients = serde_json::to_value(&config.report_recipients).unwrap_or_default();
        let result = sqlx::query(
            r#"
            UPDATE applets
            SET report_server_ip = $2, report_public_key = $3, report_recipients = $4,
                report_include_user_id = $5, report_include_case_id = $6,
                report_email_body = $7, updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(&config.report_server_ip)
        .bind(&config.report_public_key)
        .bind(recipients)
        .bind(config.report_include_user_id)
        .bind(config.report_include_case_id)
        .bind(&config.report_email_body)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drops the encryption parameters during an ownership transfer.
    pub async fn clear_encryption_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE applets
            SET encryption = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Soft-deletes the applet row; content rows are removed by the caller.
    pub async fn soft_delete_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE applets
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

}

fn list_for_user_sql() -> String {
    format!(
        r#"
        SELECT {APPLET_COLUMNS}
        FROM applets
        WHERE NOT is_deleted AND EXISTS (
            SELECT 1 FROM user_applet_accesses uaa
            WHERE uaa.applet_id = applets.id AND uaa.user_id = $1
        )
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    )
}

fn list_in_workspace_sql() -> String {
    format!(
        r#"
        SELECT {APPLET_COLUMNS}
        FROM applets
        WHERE NOT is_deleted AND EXISTS (
            SELECT 1 FROM user_applet_accesses uaa
            WHERE uaa.applet_id = applets.id
              AND uaa.owner_id = $1 AND uaa.user_id = $2
        )
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listings_page_newest_first() {
        // The access join must never dictate page order or duplicate rows.
        for sql in [list_for_user_sql(), list_in_workspace_sql()] {
            assert!(sql.contains("ORDER BY created_at DESC"));
            assert!(sql.contains("EXISTS"));
            assert!(!sql.contains("DISTINCT ON"));
        }
    }

    #[test]
    fn test_duplicate_pattern_escapes_regex_metacharacters() {
        let base = "my (app) + more";
        let pattern = format!(r"^{} \(\d+\)$", regex::escape(base));
        let re = regex::Regex::new(&pattern).unwrap();
        assert!(re.is_match("my (app) + more (2)"));
        assert!(!re.is_match("my app + more (2)"));
    }
}
