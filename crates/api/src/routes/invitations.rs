//! Invitation endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    InvitationResponse, InviteManagersRequest, InviteRespondentRequest, InviteReviewerRequest,
};
use shared::pagination::PageQuery;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::ListResponse;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct InvitationListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

pub async fn list_invitations(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<InvitationListQuery>,
) -> Result<Json<ListResponse<InvitationResponse>>, ApiError> {
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (invitations, total) = state
        .invitations
        .list_pending(auth.user_id, page.per_page(), page.offset())
        .await?;
    Ok(Json(ListResponse::new(
        invitations,
        page.page(),
        page.per_page(),
        total,
    )))
}

pub async fn get_invitation(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(key): Path<Uuid>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let invitation = state.invitations.get_by_key(auth.user_id, key).await?;
    Ok(Json(invitation))
}

pub async fn invite_respondent(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<InviteRespondentRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    request.validate()?;
    let invitation = state
        .invitations
        .invite_respondent(auth.user_id, applet_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn invite_reviewer(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<InviteReviewerRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    request.validate()?;
    let invitation = state
        .invitations
        .invite_reviewer(auth.user_id, applet_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn invite_managers(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<InviteManagersRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    request.validate()?;
    let invitation = state
        .invitations
        .invite_managers(auth.user_id, applet_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(key): Path<Uuid>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let invitation = state.invitations.accept(auth.user_id, key).await?;
    Ok(Json(invitation))
}

pub async fn decline_invitation(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(key): Path<Uuid>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let invitation = state.invitations.decline(auth.user_id, key).await?;
    Ok(Json(invitation))
}
