//! Ownership transfer endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::{InitiateTransferRequest, TransferResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

pub async fn initiate_transfer(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<InitiateTransferRequest>,
) -> Result<(StatusCode, Json<TransferResponse>), ApiError> {
    request.validate()?;
    let transfer = state
        .transfers
        .initiate(auth.user_id, applet_id, &request.email)
        .await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

pub async fn accept_transfer(
    State(state): State<AppState>,
    auth: UserAuth,
    Path((applet_id, key)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.transfers.accept(auth.user_id, applet_id, key).await?;
    Ok(StatusCode::OK)
}

pub async fn decline_transfer(
    State(state): State<AppState>,
    auth: UserAuth,
    Path((applet_id, key)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.transfers.decline(auth.user_id, applet_id, key).await?;
    Ok(StatusCode::OK)
}
