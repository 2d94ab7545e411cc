//! Answer endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::{Answer, SubmitAnswerRequest};
use shared::pagination::PageQuery;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::ListResponse;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct AnswerListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

pub async fn submit_answer(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<(StatusCode, Json<Answer>), ApiError> {
    request.validate()?;
    let answer = state.answers.submit(auth.user_id, applet_id, request).await?;
    Ok((StatusCode::CREATED, Json(answer)))
}

pub async fn list_answers(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Query(query): Query<AnswerListQuery>,
) -> Result<Json<ListResponse<Answer>>, ApiError> {
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (answers, total) = state
        .answers
        .list(auth.user_id, applet_id, page.per_page(), page.offset())
        .await?;
    Ok(Json(ListResponse::new(
        answers,
        page.page(),
        page.per_page(),
        total,
    )))
}
