//! Applet composition service.
//!
//! Every multi-step path (create, update, duplicate, delete) runs in one
//! transaction. Client-supplied activity keys are resolved to database ids
//! through a map built while inserting activities, so flow items can
//! reference activities created in the same request.

use std::collections::{HashMap, HashSet};

use domain::models::{
    AccessMeta, ActivityCreate, ActivityFull, ActivityItemCreate, ActivityItemFull,
    ActivityItemResponse, ActivityItemUpdate, ActivityResponse, ActivityUpdate, AppletDetailResponse,
    AppletFull, AppletResponse, CreateAppletRequest, DuplicateAppletRequest, FlowCreate, FlowFull,
    FlowItemCreate, FlowItemFull, FlowItemUpdate, FlowResponse, FlowUpdate, ReportConfiguration,
    RetentionRequest, RetentionType, Role, UpdateAppletRequest,
};
use domain::services::unique_name::unique_display_name;
use domain::services::version::{next_version, INITIAL_VERSION};
use persistence::entities::AppletEntity;
use persistence::repositories::{
    ActivityItemWrite, ActivityRepository, ActivityWrite, AlertRepository, AnswerRepository,
    AppletAccessRepository, AppletHistoryRepository, AppletRepository, AppletWrite, EventRepository,
    FlowRepository, FlowWrite, InvitationRepository, VersionRow,
};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

/// Orchestrates applet content composition over the repositories.
#[derive(Clone)]
pub struct AppletService {
    pool: PgPool,
    applets: AppletRepository,
    histories: AppletHistoryRepository,
    activities: ActivityRepository,
    flows: FlowRepository,
    events: EventRepository,
    accesses: AppletAccessRepository,
    invitations: InvitationRepository,
    answers: AnswerRepository,
    alerts: AlertRepository,
}

impl AppletService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            applets: AppletRepository::new(pool.clone()),
            histories: AppletHistoryRepository::new(pool.clone()),
            activities: ActivityRepository::new(pool.clone()),
            flows: FlowRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            accesses: AppletAccessRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            answers: AnswerRepository::new(pool.clone()),
            alerts: AlertRepository::new(pool.clone()),
            pool,
        }
    }

    /// Creates an applet with its full content tree and grants the creator
    /// Owner and Respondent access.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateAppletRequest,
    ) -> Result<AppletFull, ApiError> {
        self.ensure_name_free(user_id, &request.display_name, None)
            .await?;

        let applet_id = Uuid::new_v4();
        let write = AppletWrite {
            display_name: request.display_name.clone(),
            description: request.description.clone(),
            about: request.about.clone(),
            image: request.image.clone(),
            watermark: request.watermark.clone(),
            theme_id: request.theme_id,
            version: INITIAL_VERSION.to_string(),
            encryption: Some(request.encryption.clone()),
            report_configuration: request.report_configuration.clone().unwrap_or_default(),
        };

        let mut tx = self.pool.begin().await?;

        let entity = self.applets.insert_tx(&mut tx, applet_id, &write).await?;
        self.grant_owner_accesses(&mut tx, applet_id, user_id, None)
            .await?;

        let (activities, flows) = self
            .insert_content_tx(&mut tx, applet_id, &request.activities, &request.activity_flows)
            .await?;

        let full = assemble_full(&entity, activities, flows);
        self.histories
            .insert_tx(
                &mut tx,
                applet_id,
                &full.version,
                user_id,
                &full.display_name,
                serde_json::to_value(&full)
                    .map_err(|e| ApiError::Internal(format!("Snapshot serialization: {e}")))?,
            )
            .await?;

        tx.commit().await?;

        info!(applet_id = %applet_id, user_id = %user_id, version = %full.version, "Applet created");
        Ok(full)
    }

    /// Rebuilds an applet's content tree, bumps the version and appends a
    /// history snapshot.
    pub async fn update(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        request: UpdateAppletRequest,
    ) -> Result<AppletFull, ApiError> {
        if !self.accesses.can_edit_applet(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Editing not allowed".into()));
        }
        let current = self
            .applets
            .find_by_id(applet_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Applet not found".into()))?;
        self.ensure_name_free(user_id, &request.display_name, Some(applet_id))
            .await?;

        let version = next_version(&current.version)?;
        let write = AppletWrite {
            display_name: request.display_name.clone(),
            description: request.description.clone(),
            about: request.about.clone(),
            image: request.image.clone(),
            watermark: request.watermark.clone(),
            theme_id: request.theme_id,
            version: version.clone(),
            encryption: request.encryption.clone(),
            report_configuration: current.report_configuration(),
        };

        let mut tx = self.pool.begin().await?;

        let old_activity_ids: HashSet<Uuid> = self
            .activities
            .ids_by_applet_tx(&mut tx, applet_id)
            .await?
            .into_iter()
            .collect();

        // Children first, then parents. Flow events always go: rebuilt flows
        // get fresh ids.
        self.events.delete_flow_events_by_applet_tx(&mut tx, applet_id).await?;
        self.flows.delete_items_by_applet_tx(&mut tx, applet_id).await?;
        self.flows.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.activities
            .delete_items_by_applet_tx(&mut tx, applet_id)
            .await?;
        self.activities.delete_by_applet_tx(&mut tx, applet_id).await?;

        let entity = self.applets.update_tx(&mut tx, applet_id, &write).await?;

        let create_activities: Vec<ActivityCreate> =
            request.activities.iter().map(activity_update_to_create).collect();
        let create_flows: Vec<FlowCreate> =
            request.activity_flows.iter().map(flow_update_to_create).collect();
        let kept_ids: HashMap<Uuid, Uuid> = request
            .activities
            .iter()
            .filter_map(|a| a.id.map(|id| (a.key, id)))
            .collect();

        let (activities, flows) = self
            .insert_content_with_ids_tx(&mut tx, applet_id, &create_activities, &create_flows, &kept_ids)
            .await?;

        // Default events follow the activity set: drop the removed, add the new.
        let new_ids: HashSet<Uuid> = activities.iter().map(|a| a.id).collect();
        let removed: Vec<Uuid> = old_activity_ids.difference(&new_ids).copied().collect();
        if !removed.is_empty() {
            self.events.delete_by_activity_ids_tx(&mut tx, &removed).await?;
        }

        let full = assemble_full(&entity, activities, flows);
        self.histories
            .insert_tx(
                &mut tx,
                applet_id,
                &version,
                user_id,
                &full.display_name,
                serde_json::to_value(&full)
                    .map_err(|e| ApiError::Internal(format!("Snapshot serialization: {e}")))?,
            )
            .await?;

        tx.commit().await?;

        info!(applet_id = %applet_id, user_id = %user_id, version = %version, "Applet updated");
        Ok(full)
    }

    /// Copies an applet under a new name, keeping the original owner.
    pub async fn duplicate(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        request: DuplicateAppletRequest,
    ) -> Result<AppletFull, ApiError> {
        if !self.accesses.can_edit_applet(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Duplication not allowed".into()));
        }
        let source = self.load_full(applet_id).await?;
        self.ensure_name_free(user_id, &request.display_name, None)
            .await?;
        let owner_id = self
            .accesses
            .get_applet_owner(applet_id)
            .await?
            .ok_or_else(|| ApiError::Internal("Applet has no owner access".into()))?;

        // Source activity ids double as keys so flow items carry over.
        let activities: Vec<ActivityCreate> = source
            .activities
            .iter()
            .map(|a| ActivityCreate {
                name: a.name.clone(),
                key: a.id,
                description: a.description.clone(),
                splash_screen: a.splash_screen.clone(),
                image: a.image.clone(),
                show_all_at_once: a.show_all_at_once,
                is_skippable: a.is_skippable,
                is_reviewable: a.is_reviewable,
                response_is_editable: a.response_is_editable,
                is_hidden: a.is_hidden,
                items: a
                    .items
                    .iter()
                    .map(|i| ActivityItemCreate {
                        name: i.name.clone(),
                        question: i.question.clone(),
                        response_type: i.response_type.clone(),
                        response_values: i.response_values.clone(),
                        config: i.config.clone(),
                        is_hidden: i.is_hidden,
                    })
                    .collect(),
            })
            .collect();
        let flows: Vec<FlowCreate> = source
            .activity_flows
            .iter()
            .map(|f| FlowCreate {
                name: f.name.clone(),
                description: f.description.clone(),
                is_single_report: f.is_single_report,
                hide_badge: f.hide_badge,
                is_hidden: f.is_hidden,
                items: f
                    .items
                    .iter()
                    .map(|item| FlowItemCreate {
                        activity_key: item.activity_id,
                    })
                    .collect(),
            })
            .collect();

        let new_id = Uuid::new_v4();
        let write = AppletWrite {
            display_name: request.display_name.clone(),
            description: source.description.clone(),
            about: source.about.clone(),
            image: source.image.clone(),
            watermark: source.watermark.clone(),
            theme_id: source.theme_id,
            version: INITIAL_VERSION.to_string(),
            encryption: Some(request.encryption.clone()),
            report_configuration: source.report_configuration.clone(),
        };

        let mut tx = self.pool.begin().await?;

        let entity = self.applets.insert_tx(&mut tx, new_id, &write).await?;
        let manager = (user_id != owner_id).then_some(user_id);
        self.grant_owner_accesses(&mut tx, new_id, owner_id, manager)
            .await?;
        let (activities, flows) = self
            .insert_content_tx(&mut tx, new_id, &activities, &flows)
            .await?;

        let full = assemble_full(&entity, activities, flows);
        self.histories
            .insert_tx(
                &mut tx,
                new_id,
                &full.version,
                user_id,
                &full.display_name,
                serde_json::to_value(&full)
                    .map_err(|e| ApiError::Internal(format!("Snapshot serialization: {e}")))?,
            )
            .await?;

        tx.commit().await?;

        info!(applet_id = %new_id, source_id = %applet_id, user_id = %user_id, "Applet duplicated");
        Ok(full)
    }

    /// Soft-deletes an applet and removes its dependents in order.
    pub async fn delete(&self, user_id: Uuid, applet_id: Uuid) -> Result<(), ApiError> {
        if !self.accesses.can_edit_applet(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Deletion not allowed".into()));
        }

        let mut tx = self.pool.begin().await?;

        self.flows.delete_items_by_applet_tx(&mut tx, applet_id).await?;
        self.flows.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.activities
            .delete_items_by_applet_tx(&mut tx, applet_id)
            .await?;
        self.activities.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.events.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.answers.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.alerts.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.invitations.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.accesses.delete_all_by_applet_tx(&mut tx, applet_id).await?;
        let deleted = self.applets.soft_delete_tx(&mut tx, applet_id).await?;
        if !deleted {
            return Err(ApiError::NotFound("Applet not found".into()));
        }

        tx.commit().await?;

        info!(applet_id = %applet_id, user_id = %user_id, "Applet deleted");
        Ok(())
    }

    /// Picks a display name free among the user's accessible applets.
    pub async fn unique_name(
        &self,
        user_id: Uuid,
        name: &str,
        exclude_applet_id: Option<Uuid>,
    ) -> Result<String, ApiError> {
        let existing = self
            .applets
            .name_duplicates(user_id, name, exclude_applet_id)
            .await?;
        Ok(unique_display_name(name, &existing))
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        language: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AppletResponse>, i64), ApiError> {
        let entities = self.applets.list_for_user(user_id, limit, offset).await?;
        let total = self.applets.count_for_user(user_id).await?;
        let responses = entities.iter().map(|e| project_summary(e, language)).collect();
        Ok((responses, total))
    }

    pub async fn list_in_workspace(
        &self,
        owner_id: Uuid,
        user_id: Uuid,
        language: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AppletResponse>, ApiError> {
        let entities = self
            .applets
            .list_in_workspace(owner_id, user_id, limit, offset)
            .await?;
        Ok(entities.iter().map(|e| project_summary(e, language)).collect())
    }

    /// Full applet detail in one language. Requires any role on the applet.
    pub async fn get_detail(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        language: &str,
    ) -> Result<AppletDetailResponse, ApiError> {
        if self
            .accesses
            .applet_priority_role(applet_id, user_id)
            .await?
            .is_none()
        {
            return Err(ApiError::Forbidden("No access to this applet".into()));
        }
        let entity = self
            .applets
            .find_by_id(applet_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Applet not found".into()))?;
        let full = self.assemble_from_db(&entity).await?;
        Ok(project_detail(&entity, &full, language))
    }

    /// Public applet lookup through an access link.
    pub async fn get_by_link(
        &self,
        link: Uuid,
        language: &str,
    ) -> Result<AppletDetailResponse, ApiError> {
        let entity = self
            .applets
            .find_by_link(link)
            .await?
            .ok_or_else(|| ApiError::NotFound("Link not found".into()))?;
        let full = self.assemble_from_db(&entity).await?;
        Ok(project_detail(&entity, &full, language))
    }

    pub async fn versions(&self, user_id: Uuid, applet_id: Uuid) -> Result<Vec<VersionRow>, ApiError> {
        if self
            .accesses
            .applet_priority_role(applet_id, user_id)
            .await?
            .is_none()
        {
            return Err(ApiError::Forbidden("No access to this applet".into()));
        }
        Ok(self.histories.list_versions(applet_id).await?)
    }

    /// Snapshot of one historical version, as stored at write time.
    pub async fn version_snapshot(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        version: &str,
    ) -> Result<AppletFull, ApiError> {
        if self
            .accesses
            .applet_priority_role(applet_id, user_id)
            .await?
            .is_none()
        {
            return Err(ApiError::Forbidden("No access to this applet".into()));
        }
        let entity = self
            .histories
            .find_by_id_version(applet_id, version)
            .await?
            .ok_or_else(|| ApiError::NotFound("Version not found".into()))?;
        serde_json::from_value(entity.snapshot)
            .map_err(|e| ApiError::Internal(format!("Snapshot deserialization: {e}")))
    }

    pub async fn create_access_link(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        require_login: bool,
    ) -> Result<Uuid, ApiError> {
        if !self.accesses.can_edit_applet(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Link management not allowed".into()));
        }
        self.require_applet(applet_id).await?;
        let link = Uuid::new_v4();
        if !self.applets.create_link(applet_id, link, require_login).await? {
            return Err(ApiError::Conflict("Access link already exists".into()));
        }
        info!(applet_id = %applet_id, user_id = %user_id, "Access link created");
        Ok(link)
    }

    pub async fn get_access_link(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
    ) -> Result<(Uuid, bool), ApiError> {
        if !self.accesses.can_edit_applet(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Link management not allowed".into()));
        }
        let entity = self.require_applet(applet_id).await?;
        match entity.link {
            Some(link) => Ok((link, entity.require_login.unwrap_or(true))),
            None => Err(ApiError::NotFound("No access link".into())),
        }
    }

    pub async fn delete_access_link(&self, user_id: Uuid, applet_id: Uuid) -> Result<(), ApiError> {
        if !self.accesses.can_edit_applet(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Link management not allowed".into()));
        }
        if !self.applets.delete_link(applet_id).await? {
            return Err(ApiError::NotFound("No access link".into()));
        }
        info!(applet_id = %applet_id, user_id = %user_id, "Access link removed");
        Ok(())
    }

    pub async fn set_retention(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        request: &RetentionRequest,
    ) -> Result<(), ApiError> {
        if !self.accesses.can_set_retention(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Retention management not allowed".into()));
        }
        if request.retention != RetentionType::Indefinitely && request.period.is_none() {
            return Err(ApiError::Validation("Retention period is required".into()));
        }
        let period = match request.retention {
            RetentionType::Indefinitely => None,
            _ => request.period,
        };
        if !self
            .applets
            .set_retention(applet_id, request.retention.as_str(), period)
            .await?
        {
            return Err(ApiError::NotFound("Applet not found".into()));
        }
        info!(applet_id = %applet_id, user_id = %user_id, retention = request.retention.as_str(),
              "Retention updated");
        Ok(())
    }

    pub async fn set_published(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        is_published: bool,
    ) -> Result<(), ApiError> {
        if !self
            .accesses
            .has_any_role(applet_id, user_id, Role::super_reviewers())
            .await?
        {
            return Err(ApiError::Forbidden("Publishing not allowed".into()));
        }
        if !self.applets.set_published(applet_id, is_published).await? {
            return Err(ApiError::NotFound("Applet not found".into()));
        }
        info!(applet_id = %applet_id, user_id = %user_id, is_published, "Publish state changed");
        Ok(())
    }

    pub async fn set_report_configuration(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        config: &ReportConfiguration,
    ) -> Result<(), ApiError> {
        if !self.accesses.can_edit_applet(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Report configuration not allowed".into()));
        }
        if !self.applets.set_report_configuration(applet_id, config).await? {
            return Err(ApiError::NotFound("Applet not found".into()));
        }
        info!(applet_id = %applet_id, user_id = %user_id, "Report configuration updated");
        Ok(())
    }

    /// Drops every schedule event on an applet and recreates the default
    /// one per activity and flow, in one transaction.
    pub async fn reset_events(&self, user_id: Uuid, applet_id: Uuid) -> Result<(), ApiError> {
        if !self.accesses.can_set_schedule(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Schedule changes not allowed".into()));
        }
        self.require_applet(applet_id).await?;

        let activities = self.activities.list_by_applet(applet_id).await?;
        let flows = self.flows.list_by_applet(applet_id).await?;

        let mut tx = self.pool.begin().await?;
        self.events.delete_by_applet_tx(&mut tx, applet_id).await?;
        for activity in &activities {
            self.events
                .insert_default_for_activity_tx(&mut tx, applet_id, activity.id)
                .await?;
        }
        for flow in &flows {
            self.events
                .insert_default_for_flow_tx(&mut tx, applet_id, flow.id)
                .await?;
        }
        tx.commit().await?;

        info!(applet_id = %applet_id, user_id = %user_id, "Schedule events reset to defaults");
        Ok(())
    }

    /// Loads the complete current state of an applet.
    pub async fn load_full(&self, applet_id: Uuid) -> Result<AppletFull, ApiError> {
        let entity = self.require_applet(applet_id).await?;
        self.assemble_from_db(&entity).await
    }

    async fn require_applet(&self, applet_id: Uuid) -> Result<AppletEntity, ApiError> {
        self.applets
            .find_by_id(applet_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Applet not found".into()))
    }

    async fn ensure_name_free(
        &self,
        user_id: Uuid,
        name: &str,
        exclude_applet_id: Option<Uuid>,
    ) -> Result<(), ApiError> {
        let existing = self
            .applets
            .name_duplicates(user_id, name, exclude_applet_id)
            .await?;
        let taken = existing
            .iter()
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(name.trim()));
        if taken {
            return Err(ApiError::Conflict(format!(
                "Applet name already exists: {name}"
            )));
        }
        Ok(())
    }

    async fn grant_owner_accesses(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
        owner_id: Uuid,
        manager_id: Option<Uuid>,
    ) -> Result<(), ApiError> {
        self.accesses
            .add_role_tx(
                conn,
                owner_id,
                applet_id,
                owner_id,
                None,
                Role::Owner,
                &AccessMeta::default(),
            )
            .await?;
        self.accesses
            .add_role_tx(
                conn,
                owner_id,
                applet_id,
                owner_id,
                None,
                Role::Respondent,
                &AccessMeta::respondent(Uuid::new_v4().to_string(), None),
            )
            .await?;
        if let Some(manager_id) = manager_id {
            self.accesses
                .add_role_tx(
                    conn,
                    manager_id,
                    applet_id,
                    owner_id,
                    None,
                    Role::Manager,
                    &AccessMeta::default(),
                )
                .await?;
            self.accesses
                .add_role_tx(
                    conn,
                    manager_id,
                    applet_id,
                    owner_id,
                    None,
                    Role::Respondent,
                    &AccessMeta::respondent(Uuid::new_v4().to_string(), None),
                )
                .await?;
        }
        Ok(())
    }

    async fn insert_content_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
        activities: &[ActivityCreate],
        flows: &[FlowCreate],
    ) -> Result<(Vec<ActivityFull>, Vec<FlowFull>), ApiError> {
        self.insert_content_with_ids_tx(conn, applet_id, activities, flows, &HashMap::new())
            .await
    }

    /// Inserts activities, items, flows and flow items. `kept_ids` maps a
    /// request key to the database id an existing activity keeps across an
    /// update; anything else gets a fresh id. Positions are 1-based request
    /// order.
    async fn insert_content_with_ids_tx(
        &self,
        conn: &mut PgConnection,
        applet_id: Uuid,
        activities: &[ActivityCreate],
        flows: &[FlowCreate],
        kept_ids: &HashMap<Uuid, Uuid>,
    ) -> Result<(Vec<ActivityFull>, Vec<FlowFull>), ApiError> {
        let mut key_to_id: HashMap<Uuid, Uuid> = HashMap::new();
        let mut full_activities = Vec::with_capacity(activities.len());

        for (index, activity) in activities.iter().enumerate() {
            let ordering = index as i32 + 1;
            let activity_id = kept_ids.get(&activity.key).copied().unwrap_or_else(Uuid::new_v4);
            if key_to_id.insert(activity.key, activity_id).is_some() {
                return Err(ApiError::Validation(format!(
                    "Duplicate activity key: {}",
                    activity.key
                )));
            }

            self.activities
                .insert_tx(
                    conn,
                    &ActivityWrite {
                        id: activity_id,
                        applet_id,
                        name: activity.name.clone(),
                        description: activity.description.clone(),
                        splash_screen: activity.splash_screen.clone(),
                        image: activity.image.clone(),
                        show_all_at_once: activity.show_all_at_once,
                        is_skippable: activity.is_skippable,
                        is_reviewable: activity.is_reviewable,
                        response_is_editable: activity.response_is_editable,
                        is_hidden: activity.is_hidden,
                        ordering,
                    },
                )
                .await?;
            if !kept_ids.contains_key(&activity.key) {
                self.events
                    .insert_default_for_activity_tx(conn, applet_id, activity_id)
                    .await?;
            }

            let mut full_items = Vec::with_capacity(activity.items.len());
            for (item_index, item) in activity.items.iter().enumerate() {
                let item_id = Uuid::new_v4();
                let item_ordering = item_index as i32 + 1;
                self.activities
                    .insert_item_tx(
                        conn,
                        &ActivityItemWrite {
                            id: item_id,
                            activity_id,
                            name: item.name.clone(),
                            question: item.question.clone(),
                            response_type: item.response_type.clone(),
                            response_values: item.response_values.clone(),
                            config: item.config.clone(),
                            is_hidden: item.is_hidden,
                            ordering: item_ordering,
                        },
                    )
                    .await?;
                full_items.push(ActivityItemFull {
                    id: item_id,
                    activity_id,
                    name: item.name.clone(),
                    question: item.question.clone(),
                    response_type: item.response_type.clone(),
                    response_values: item.response_values.clone(),
                    config: item.config.clone(),
                    is_hidden: item.is_hidden,
                    ordering: item_ordering,
                });
            }

            full_activities.push(ActivityFull {
                id: activity_id,
                key: activity.key,
                name: activity.name.clone(),
                description: activity.description.clone(),
                splash_screen: activity.splash_screen.clone(),
                image: activity.image.clone(),
                show_all_at_once: activity.show_all_at_once,
                is_skippable: activity.is_skippable,
                is_reviewable: activity.is_reviewable,
                response_is_editable: activity.response_is_editable,
                is_hidden: activity.is_hidden,
                ordering,
                items: full_items,
            });
        }

        let mut full_flows = Vec::with_capacity(flows.len());
        for (index, flow) in flows.iter().enumerate() {
            let ordering = index as i32 + 1;
            let flow_id = Uuid::new_v4();
            self.flows
                .insert_tx(
                    conn,
                    &FlowWrite {
                        id: flow_id,
                        applet_id,
                        name: flow.name.clone(),
                        description: flow.description.clone(),
                        is_single_report: flow.is_single_report,
                        hide_badge: flow.hide_badge,
                        is_hidden: flow.is_hidden,
                        ordering,
                    },
                )
                .await?;
            self.events
                .insert_default_for_flow_tx(conn, applet_id, flow_id)
                .await?;

            let mut full_items = Vec::with_capacity(flow.items.len());
            for (item_index, item) in flow.items.iter().enumerate() {
                // Unknown keys are a client error, never dropped silently.
                let activity_id = *key_to_id.get(&item.activity_key).ok_or_else(|| {
                    ApiError::Validation(format!("Unknown activity key: {}", item.activity_key))
                })?;
                let item_ordering = item_index as i32 + 1;
                let inserted = self
                    .flows
                    .insert_item_tx(conn, flow_id, activity_id, item_ordering)
                    .await?;
                full_items.push(FlowItemFull {
                    id: inserted.id,
                    activity_flow_id: flow_id,
                    activity_id,
                    ordering: item_ordering,
                });
            }

            full_flows.push(FlowFull {
                id: flow_id,
                name: flow.name.clone(),
                description: flow.description.clone(),
                is_single_report: flow.is_single_report,
                hide_badge: flow.hide_badge,
                is_hidden: flow.is_hidden,
                ordering,
                items: full_items,
            });
        }

        Ok((full_activities, full_flows))
    }

    async fn assemble_from_db(&self, entity: &AppletEntity) -> Result<AppletFull, ApiError> {
        let activity_entities = self.activities.list_by_applet(entity.id).await?;
        let item_entities = self.activities.list_items_by_applet(entity.id).await?;
        let flow_entities = self.flows.list_by_applet(entity.id).await?;
        let flow_item_entities = self.flows.list_items_by_applet(entity.id).await?;

        let mut items_by_activity: HashMap<Uuid, Vec<ActivityItemFull>> = HashMap::new();
        for item in &item_entities {
            items_by_activity
                .entry(item.activity_id)
                .or_default()
                .push(ActivityItemFull {
                    id: item.id,
                    activity_id: item.activity_id,
                    name: item.name.clone(),
                    question: item.question_map(),
                    response_type: item.response_type.clone(),
                    response_values: item.response_values.clone(),
                    config: item.config.clone(),
                    is_hidden: item.is_hidden,
                    ordering: item.ordering,
                });
        }

        let activities = activity_entities
            .iter()
            .map(|a| ActivityFull {
                id: a.id,
                key: a.id,
                name: a.name.clone(),
                description: a.description_map(),
                splash_screen: a.splash_screen.clone(),
                image: a.image.clone(),
                show_all_at_once: a.show_all_at_once,
                is_skippable: a.is_skippable,
                is_reviewable: a.is_reviewable,
                response_is_editable: a.response_is_editable,
                is_hidden: a.is_hidden,
                ordering: a.ordering,
                items: items_by_activity.remove(&a.id).unwrap_or_default(),
            })
            .collect();

        let mut items_by_flow: HashMap<Uuid, Vec<FlowItemFull>> = HashMap::new();
        for item in &flow_item_entities {
            items_by_flow.entry(item.flow_id).or_default().push(FlowItemFull {
                id: item.id,
                activity_flow_id: item.flow_id,
                activity_id: item.activity_id,
                ordering: item.ordering,
            });
        }

        let flows = flow_entities
            .iter()
            .map(|f| FlowFull {
                id: f.id,
                name: f.name.clone(),
                description: f.description_map(),
                is_single_report: f.is_single_report,
                hide_badge: f.hide_badge,
                is_hidden: f.is_hidden,
                ordering: f.ordering,
                items: items_by_flow.remove(&f.id).unwrap_or_default(),
            })
            .collect();

        Ok(assemble_full(entity, activities, flows))
    }
}

fn assemble_full(
    entity: &AppletEntity,
    activities: Vec<ActivityFull>,
    flows: Vec<FlowFull>,
) -> AppletFull {
    AppletFull {
        id: entity.id,
        display_name: entity.display_name.clone(),
        version: entity.version.clone(),
        description: entity.description_map(),
        about: entity.about_map(),
        image: entity.image.clone(),
        watermark: entity.watermark.clone(),
        theme_id: entity.theme_id,
        encryption: entity.encryption_params(),
        report_configuration: entity.report_configuration(),
        is_published: entity.is_published,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
        activities,
        activity_flows: flows,
    }
}

fn project_summary(entity: &AppletEntity, language: &str) -> AppletResponse {
    AppletResponse {
        id: entity.id,
        display_name: entity.display_name.clone(),
        version: entity.version.clone(),
        description: entity.description_map().resolve(language).to_string(),
        about: entity.about_map().resolve(language).to_string(),
        image: entity.image.clone(),
        watermark: entity.watermark.clone(),
        theme_id: entity.theme_id,
        is_published: entity.is_published,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

fn project_detail(entity: &AppletEntity, full: &AppletFull, language: &str) -> AppletDetailResponse {
    AppletDetailResponse {
        id: full.id,
        display_name: full.display_name.clone(),
        version: full.version.clone(),
        description: full.description.resolve(language).to_string(),
        about: full.about.resolve(language).to_string(),
        image: full.image.clone(),
        watermark: full.watermark.clone(),
        theme_id: full.theme_id,
        link: entity.link,
        require_login: entity.require_login,
        encryption: full.encryption.clone(),
        report_configuration: full.report_configuration.clone(),
        retention_type: entity.retention_type.clone(),
        retention_period: entity.retention_period,
        is_published: full.is_published,
        created_at: full.created_at,
        updated_at: full.updated_at,
        activities: full
            .activities
            .iter()
            .map(|a| ActivityResponse {
                id: a.id,
                name: a.name.clone(),
                description: a.description.resolve(language).to_string(),
                splash_screen: a.splash_screen.clone(),
                image: a.image.clone(),
                show_all_at_once: a.show_all_at_once,
                is_skippable: a.is_skippable,
                is_reviewable: a.is_reviewable,
                response_is_editable: a.response_is_editable,
                is_hidden: a.is_hidden,
                ordering: a.ordering,
                items: a
                    .items
                    .iter()
                    .map(|i| ActivityItemResponse {
                        id: i.id,
                        name: i.name.clone(),
                        question: i.question.resolve(language).to_string(),
                        response_type: i.response_type.clone(),
                        response_values: i.response_values.clone(),
                        config: i.config.clone(),
                        is_hidden: i.is_hidden,
                        ordering: i.ordering,
                    })
                    .collect(),
            })
            .collect(),
        activity_flows: full
            .activity_flows
            .iter()
            .map(|f| FlowResponse {
                id: f.id,
                name: f.name.clone(),
                description: f.description.resolve(language).to_string(),
                is_single_report: f.is_single_report,
                hide_badge: f.hide_badge,
                is_hidden: f.is_hidden,
                ordering: f.ordering,
                activity_ids: f.items.iter().map(|i| i.activity_id).collect(),
            })
            .collect(),
    }
}

fn activity_update_to_create(activity: &ActivityUpdate) -> ActivityCreate {
    ActivityCreate {
        name: activity.name.clone(),
        key: activity.key,
        description: activity.description.clone(),
        splash_screen: activity.splash_screen.clone(),
        image: activity.image.clone(),
        show_all_at_once: activity.show_all_at_once,
        is_skippable: activity.is_skippable,
        is_reviewable: activity.is_reviewable,
        response_is_editable: activity.response_is_editable,
        is_hidden: activity.is_hidden,
        items: activity.items.iter().map(item_update_to_create).collect(),
    }
}

fn item_update_to_create(item: &ActivityItemUpdate) -> ActivityItemCreate {
    ActivityItemCreate {
        name: item.name.clone(),
        question: item.question.clone(),
        response_type: item.response_type.clone(),
        response_values: item.response_values.clone(),
        config: item.config.clone(),
        is_hidden: item.is_hidden,
    }
}

fn flow_update_to_create(flow: &FlowUpdate) -> FlowCreate {
    FlowCreate {
        name: flow.name.clone(),
        description: flow.description.clone(),
        is_single_report: flow.is_single_report,
        hide_badge: flow.hide_badge,
        is_hidden: flow.is_hidden,
        items: flow
            .items
            .iter()
            .map(|item: &FlowItemUpdate| FlowItemCreate {
                activity_key: item.activity_key,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::LanguageMap;

    fn entity(version: &str) -> AppletEntity {
        AppletEntity {
            id: Uuid::new_v4(),
            display_name: "Sleep study".to_string(),
            description: serde_json::json!({"fr": "Sommeil", "en": "Sleep"}),
            about: serde_json::json!({}),
            image: None,
            watermark: None,
            theme_id: None,
            version: version.to_string(),
            report_server_ip: None,
            report_public_key: None,
            report_recipients: serde_json::json!([]),
            report_include_user_id: false,
            report_include_case_id: false,
            report_email_body: None,
            encryption: None,
            link: None,
            require_login: None,
            retention_period: None,
            retention_type: None,
            is_published: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_project_summary_language_fallback() {
        let entity = entity("1.0.0");
        let summary = project_summary(&entity, "en");
        assert_eq!(summary.description, "Sleep");
        // Missing language falls back to the first stored pair.
        let summary = project_summary(&entity, "de");
        assert_eq!(summary.description, "Sommeil");
        assert_eq!(summary.about, "");
    }

    #[test]
    fn test_assemble_full_carries_content() {
        let entity = entity("1.0.5");
        let activity_id = Uuid::new_v4();
        let full = assemble_full(
            &entity,
            vec![ActivityFull {
                id: activity_id,
                key: activity_id,
                name: "Check-in".to_string(),
                description: LanguageMap::new(),
                splash_screen: None,
                image: None,
                show_all_at_once: false,
                is_skippable: false,
                is_reviewable: false,
                response_is_editable: true,
                is_hidden: false,
                ordering: 1,
                items: vec![],
            }],
            vec![],
        );
        assert_eq!(full.version, "1.0.5");
        assert_eq!(full.activities.len(), 1);
        assert!(full.activity_flows.is_empty());
    }

    #[test]
    fn test_update_to_create_preserves_keys() {
        let key = Uuid::new_v4();
        let update = ActivityUpdate {
            id: Some(Uuid::new_v4()),
            name: "Check-in".to_string(),
            key,
            description: LanguageMap::new(),
            splash_screen: None,
            image: None,
            show_all_at_once: false,
            is_skippable: true,
            is_reviewable: false,
            response_is_editable: true,
            is_hidden: false,
            items: vec![],
        };
        let create = activity_update_to_create(&update);
        assert_eq!(create.key, key);
        assert!(create.is_skippable);
    }
}
