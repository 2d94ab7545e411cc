//! Applet endpoints: CRUD, duplication, versioning, access links,
//! retention, publishing and report configuration.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    AppletDetailResponse, AppletFull, AppletLinkResponse, AppletNameRequest, AppletNameResponse,
    AppletResponse, CreateAccessLinkRequest, CreateAppletRequest, DuplicateAppletRequest,
    RetentionRequest, SetReportConfigurationRequest, UpdateAppletRequest,
};
use shared::pagination::PageQuery;

use crate::app::AppState;
use crate::config::LimitsConfig;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::ListResponse;

/// Query parameters for applet listings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct AppletListQuery {
    pub language: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl AppletListQuery {
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }

    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct LanguageQuery {
    pub language: Option<String>,
}

impl LanguageQuery {
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VersionResponse {
    pub version: String,
    pub user_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn list_applets(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<AppletListQuery>,
) -> Result<Json<ListResponse<AppletResponse>>, ApiError> {
    let page = query.page_query();
    let (applets, total) = state
        .applets
        .list(auth.user_id, query.language(), page.per_page(), page.offset())
        .await?;
    Ok(Json(ListResponse::new(
        applets,
        page.page(),
        page.per_page(),
        total,
    )))
}

pub async fn create_applet(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateAppletRequest>,
) -> Result<(StatusCode, Json<AppletFull>), ApiError> {
    request.validate()?;
    check_content_limits(
        &state.config.limits,
        request.activities.len(),
        request.activities.iter().map(|a| a.items.len()).max(),
    )?;
    let applet = state.applets.create(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(applet)))
}

pub async fn get_applet(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<AppletDetailResponse>, ApiError> {
    let applet = state
        .applets
        .get_detail(auth.user_id, applet_id, query.language())
        .await?;
    Ok(Json(applet))
}

pub async fn update_applet(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<UpdateAppletRequest>,
) -> Result<Json<AppletFull>, ApiError> {
    request.validate()?;
    check_content_limits(
        &state.config.limits,
        request.activities.len(),
        request.activities.iter().map(|a| a.items.len()).max(),
    )?;
    let applet = state.applets.update(auth.user_id, applet_id, request).await?;
    Ok(Json(applet))
}

pub async fn delete_applet(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.applets.delete(auth.user_id, applet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate_applet(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<DuplicateAppletRequest>,
) -> Result<(StatusCode, Json<AppletFull>), ApiError> {
    request.validate()?;
    let applet = state
        .applets
        .duplicate(auth.user_id, applet_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(applet)))
}

pub async fn unique_name(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<AppletNameRequest>,
) -> Result<Json<AppletNameResponse>, ApiError> {
    request.validate()?;
    let name = state
        .applets
        .unique_name(auth.user_id, &request.name, request.exclude_applet_id)
        .await?;
    Ok(Json(AppletNameResponse { name }))
}

pub async fn list_versions(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
) -> Result<Json<Vec<VersionResponse>>, ApiError> {
    let versions = state.applets.versions(auth.user_id, applet_id).await?;
    Ok(Json(
        versions
            .into_iter()
            .map(|row| VersionResponse {
                version: row.version,
                user_id: row.user_id,
                created_at: row.created_at,
            })
            .collect(),
    ))
}

pub async fn get_version(
    State(state): State<AppState>,
    auth: UserAuth,
    Path((applet_id, version)): Path<(Uuid, String)>,
) -> Result<Json<AppletFull>, ApiError> {
    let snapshot = state
        .applets
        .version_snapshot(auth.user_id, applet_id, &version)
        .await?;
    Ok(Json(snapshot))
}

pub async fn create_access_link(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<CreateAccessLinkRequest>,
) -> Result<(StatusCode, Json<AppletLinkResponse>), ApiError> {
    let link = state
        .applets
        .create_access_link(auth.user_id, applet_id, request.require_login)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AppletLinkResponse {
            link,
            require_login: request.require_login,
        }),
    ))
}

pub async fn get_access_link(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
) -> Result<Json<AppletLinkResponse>, ApiError> {
    let (link, require_login) = state.applets.get_access_link(auth.user_id, applet_id).await?;
    Ok(Json(AppletLinkResponse { link, require_login }))
}

pub async fn delete_access_link(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.applets.delete_access_link(auth.user_id, applet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public applet lookup through an anonymous access link.
pub async fn get_by_link(
    State(state): State<AppState>,
    Path(key): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<AppletDetailResponse>, ApiError> {
    let applet = state.applets.get_by_link(key, query.language()).await?;
    Ok(Json(applet))
}

/// Clears all schedule events on an applet and recreates the defaults.
pub async fn reset_events(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.applets.reset_events(auth.user_id, applet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_retention(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<RetentionRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;
    state
        .applets
        .set_retention(auth.user_id, applet_id, &request)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn publish_applet(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.applets.set_published(auth.user_id, applet_id, true).await?;
    Ok(StatusCode::OK)
}

pub async fn conceal_applet(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.applets.set_published(auth.user_id, applet_id, false).await?;
    Ok(StatusCode::OK)
}

pub async fn set_report_configuration(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(applet_id): Path<Uuid>,
    Json(request): Json<SetReportConfigurationRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;
    state
        .applets
        .set_report_configuration(auth.user_id, applet_id, &request.report_configuration)
        .await?;
    Ok(StatusCode::OK)
}

fn check_content_limits(
    limits: &LimitsConfig,
    activity_count: usize,
    largest_activity: Option<usize>,
) -> Result<(), ApiError> {
    if activity_count > limits.max_activities_per_applet {
        return Err(ApiError::Validation(format!(
            "Too many activities: the limit is {}",
            limits.max_activities_per_applet
        )));
    }
    if largest_activity.unwrap_or(0) > limits.max_items_per_activity {
        return Err(ApiError::Validation(format!(
            "Too many items in one activity: the limit is {}",
            limits.max_items_per_activity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query = AppletListQuery::default();
        assert_eq!(query.language(), "en");
        assert_eq!(query.page_query().page(), 1);
    }

    #[test]
    fn test_list_query_pagination() {
        let query = AppletListQuery {
            language: Some("fr".to_string()),
            page: Some(2),
            per_page: Some(10),
        };
        assert_eq!(query.language(), "fr");
        assert_eq!(query.page_query().offset(), 10);
    }

    #[test]
    fn test_content_limits() {
        let limits = LimitsConfig {
            max_activities_per_applet: 2,
            max_items_per_activity: 3,
        };
        assert!(check_content_limits(&limits, 2, Some(3)).is_ok());
        assert!(check_content_limits(&limits, 0, None).is_ok());
        assert!(check_content_limits(&limits, 3, Some(1)).is_err());
        assert!(check_content_limits(&limits, 1, Some(4)).is_err());
    }
}
