//! Alert endpoints for reviewers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use domain::models::{AlertResponse, Role};
use shared::pagination::PageQuery;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::ListResponse;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct AlertListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Alerts on applets where the caller holds a reviewing role.
pub async fn list_alerts(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<AlertListQuery>,
) -> Result<Json<ListResponse<AlertResponse>>, ApiError> {
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let reviewer_roles = Role::names(Role::reviewers());
    let rows = state
        .alerts
        .list_for_reviewer(auth.user_id, &reviewer_roles, page.per_page(), page.offset())
        .await?;
    let total = state
        .alerts
        .count_for_reviewer(auth.user_id, &reviewer_roles)
        .await?;

    let alerts = rows
        .into_iter()
        .map(|row| AlertResponse {
            id: row.id,
            applet_id: row.applet_id,
            applet_name: row.applet_name,
            respondent_id: row.respondent_id,
            secret_user_id: row.secret_user_id,
            message: row.message,
            is_watched: row.is_watched,
            created_at: row.created_at,
        })
        .collect();
    Ok(Json(ListResponse::new(
        alerts,
        page.page(),
        page.per_page(),
        total,
    )))
}

/// Marks one alert watched. 404 covers both a missing alert and one the
/// caller may not review.
pub async fn watch_alert(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(alert_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let reviewer_roles = Role::names(Role::reviewers());
    if !state
        .alerts
        .mark_watched(alert_id, auth.user_id, &reviewer_roles)
        .await?
    {
        return Err(ApiError::NotFound("Alert not found".into()));
    }
    Ok(StatusCode::OK)
}
