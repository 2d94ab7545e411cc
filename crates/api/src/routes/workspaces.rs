//! Workspace endpoints. A workspace is the set of applets owned by one
//! user; membership and roles come from access grants.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::str::FromStr;

use domain::models::{AppletAccess, AppletResponse, Role};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::applets::AppletListQuery;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkspaceRoleResponse {
    pub role: Option<Role>,
}

/// Highest-priority role the caller holds anywhere in the workspace.
pub async fn get_workspace_role(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<WorkspaceRoleResponse>, ApiError> {
    let role = state
        .accesses
        .workspace_priority_role(owner_id, auth.user_id)
        .await?;
    Ok(Json(WorkspaceRoleResponse { role }))
}

/// Applets in the workspace the caller can access.
pub async fn list_workspace_applets(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(owner_id): Path<Uuid>,
    Query(query): Query<AppletListQuery>,
) -> Result<Json<Vec<AppletResponse>>, ApiError> {
    let page = query.page_query();
    let applets = state
        .applets
        .list_in_workspace(
            owner_id,
            auth.user_id,
            query.language(),
            page.per_page(),
            page.offset(),
        )
        .await?;
    Ok(Json(applets))
}

/// Access grants on one applet, visible to manager-class roles.
///
/// Rows whose stored role is not recognized are skipped rather than
/// failing the whole listing.
pub async fn list_applet_accesses(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
) -> Result<Json<Vec<AppletAccess>>, ApiError> {
    let allowed = state
        .accesses
        .has_any_role(applet_id, auth.user_id, Role::managers())
        .await?;
    if !allowed {
        return Err(ApiError::Forbidden("No access to this applet".into()));
    }

    let rows = state.accesses.list_by_applet(applet_id).await?;
    let accesses = rows
        .into_iter()
        .filter_map(|row| {
            let role = Role::from_str(&row.role).ok()?;
            let meta = row.access_meta();
            Some(AppletAccess {
                id: row.id,
                user_id: row.user_id,
                applet_id: row.applet_id,
                role,
                owner_id: row.owner_id,
                invitor_id: row.invitor_id,
                meta,
                is_pinned: row.is_pinned,
                created_at: row.created_at,
            })
        })
        .collect();
    Ok(Json(accesses))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PinAccessRequest {
    pub access_id: Uuid,
}

/// Toggles the pin on a respondent access row in the workspace. Pinned
/// respondents sort first in access listings. 404 covers both an unknown
/// access id and one under a different owner.
pub async fn pin_respondent_access(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(owner_id): Path<Uuid>,
    Json(request): Json<PinAccessRequest>,
) -> Result<StatusCode, ApiError> {
    let role = state
        .accesses
        .workspace_priority_role(owner_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("No access to this workspace".into()))?;
    if !Role::managers().contains(&role) {
        return Err(ApiError::Forbidden("Pinning not allowed".into()));
    }

    if !state.accesses.toggle_pin(owner_id, request.access_id).await? {
        return Err(ApiError::NotFound("Access not found".into()));
    }
    Ok(StatusCode::OK)
}

/// Strips a user's manager-class roles on an applet. The caller must
/// outrank the target; respondent access survives.
pub async fn remove_manager_access(
    State(state): State<AppState>,
    auth: UserAuth,
    Path((applet_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let own = state
        .accesses
        .applet_priority_role(applet_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("No access to this applet".into()))?;
    let target = state
        .accesses
        .applet_priority_role(applet_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Access not found".into()))?;
    if own.priority() >= target.priority() {
        return Err(ApiError::Forbidden(
            "Cannot remove access of an equal or higher role".into(),
        ));
    }

    let removed = state.accesses.delete_manager_roles(applet_id, user_id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Access not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
