//! Repository for applet version history.
//!
//! Histories are append-only: rows are inserted on every create/update and
//! never modified or deleted, including on applet soft-delete.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::AppletHistoryEntity;

/// One row of an applet's version listing.
#[derive(Debug, Clone, FromRow)]
pub struct VersionRow {
    pub version: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Repository for applet history snapshots.
#[derive(Clone)]
pub struct AppletHistoryRepository {
    pool: PgPool,
}

impl AppletHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a snapshot inside an open transaction. The natural key is
    /// `"{applet_id}_{version}"`.
    pub async fn insert_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
        version: &str,
        user_id: Uuid,
        display_name: &str,
        snapshot: serde_json::Value,
    ) -> Result<AppletHistoryEntity, sqlx::Error> {
        let id_version = format!("{applet_id}_{version}");
        sqlx::query_as::<_, AppletHistoryEntity>(
            r#"
            INSERT INTO applet_histories (id_version, applet_id, version, user_id, display_name, snapshot)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id_version, applet_id, version, user_id, display_name, snapshot, created_at
            "#,
        )
        .bind(id_version)
        .bind(applet_id)
        .bind(version)
        .bind(user_id)
        .bind(display_name)
        .bind(snapshot)
        .fetch_one(conn)
        .await
    }

    /// Lists an applet's versions, newest first.
    pub async fn list_versions(&self, applet_id: Uuid) -> Result<Vec<VersionRow>, sqlx::Error> {
        sqlx::query_as::<_, VersionRow>(
            r#"
            SELECT version, user_id, created_at
            FROM applet_histories
            WHERE applet_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(applet_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Fetches one snapshot by its natural key.
    pub async fn find_by_id_version(
        &self,
        applet_id: Uuid,
        version: &str,
    ) -> Result<Option<AppletHistoryEntity>, sqlx::Error> {
        sqlx::query_as::<_, AppletHistoryEntity>(
            r#"
            SELECT id_version, applet_id, version, user_id, display_name, snapshot, created_at
            FROM applet_histories
            WHERE id_version = $1
            "#,
        )
        .bind(format!("{applet_id}_{version}"))
        .fetch_optional(&self.pool)
        .await
    }
}
