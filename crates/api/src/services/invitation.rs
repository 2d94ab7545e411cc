//! Invitation service.
//!
//! An inviter can only hand out roles at or below their own rank. A pending
//! invitation for the same (email, applet, role) is refreshed in place with
//! a new key instead of piling up duplicates; an approved one is final.

use std::str::FromStr;

use domain::models::{
    AccessMeta, InvitationResponse, InvitationStatus, InviteManagersRequest,
    InviteRespondentRequest, InviteReviewerRequest, Role,
};
use persistence::entities::InvitationEntity;
use persistence::repositories::{
    AppletAccessRepository, AppletRepository, InvitationRepository, UserRepository,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct InvitationService {
    pool: PgPool,
    invitations: InvitationRepository,
    accesses: AppletAccessRepository,
    applets: AppletRepository,
    users: UserRepository,
}

impl InvitationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            invitations: InvitationRepository::new(pool.clone()),
            accesses: AppletAccessRepository::new(pool.clone()),
            applets: AppletRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn invite_respondent(
        &self,
        invitor_id: Uuid,
        applet_id: Uuid,
        request: InviteRespondentRequest,
    ) -> Result<InvitationResponse, ApiError> {
        self.check_inviter(invitor_id, applet_id, Role::Respondent)
            .await?;

        let taken = self.accesses.respondent_secret_ids(applet_id).await?;
        if taken.iter().any(|id| id == &request.secret_user_id) {
            return Err(ApiError::Validation(
                "Secret user id is already used on this applet".into(),
            ));
        }

        let meta = serde_json::to_value(AccessMeta::respondent(
            request.secret_user_id.clone(),
            request.nickname.clone(),
        ))
        .map_err(|e| ApiError::Internal(format!("Meta serialization: {e}")))?;

        self.issue(
            invitor_id,
            applet_id,
            Role::Respondent,
            &request.email,
            &request.first_name,
            &request.last_name,
            meta,
        )
        .await
    }

    pub async fn invite_reviewer(
        &self,
        invitor_id: Uuid,
        applet_id: Uuid,
        request: InviteReviewerRequest,
    ) -> Result<InvitationResponse, ApiError> {
        self.check_inviter(invitor_id, applet_id, Role::Reviewer)
            .await?;

        if !self
            .accesses
            .all_respondents(applet_id, &request.respondents)
            .await?
        {
            return Err(ApiError::Validation(
                "Every listed respondent must already have respondent access".into(),
            ));
        }

        let meta = serde_json::to_value(AccessMeta::reviewer(request.respondents.clone()))
            .map_err(|e| ApiError::Internal(format!("Meta serialization: {e}")))?;

        self.issue(
            invitor_id,
            applet_id,
            Role::Reviewer,
            &request.email,
            &request.first_name,
            &request.last_name,
            meta,
        )
        .await
    }

    pub async fn invite_managers(
        &self,
        invitor_id: Uuid,
        applet_id: Uuid,
        request: InviteManagersRequest,
    ) -> Result<InvitationResponse, ApiError> {
        if !Role::invitable_managers().contains(&request.role) {
            return Err(ApiError::Validation(format!(
                "Role cannot be assigned through an invitation: {}",
                request.role
            )));
        }
        self.check_inviter(invitor_id, applet_id, request.role).await?;

        self.issue(
            invitor_id,
            applet_id,
            request.role,
            &request.email,
            &request.first_name,
            &request.last_name,
            serde_json::json!({}),
        )
        .await
    }

    /// Accepts a pending invitation addressed to the caller's email. Grants
    /// the role and marks the invitation approved in one transaction.
    pub async fn accept(&self, user_id: Uuid, key: Uuid) -> Result<InvitationResponse, ApiError> {
        let invitation = self.find_for_invitee(user_id, key).await?;
        if invitation.status != InvitationStatus::Pending.as_str() {
            return Err(ApiError::already_processed());
        }
        let role = Role::from_str(&invitation.role)
            .map_err(|e| ApiError::Internal(format!("Stored role: {e}")))?;
        let meta: AccessMeta = serde_json::from_value(invitation.meta.clone())
            .map_err(|e| ApiError::Internal(format!("Stored meta: {e}")))?;
        let owner_id = self
            .accesses
            .get_applet_owner(invitation.applet_id)
            .await?
            .ok_or_else(|| ApiError::Internal("Applet has no owner access".into()))?;

        let mut tx = self.pool.begin().await?;
        if !self
            .invitations
            .mark_processed_tx(&mut tx, invitation.id, InvitationStatus::Approved)
            .await?
        {
            return Err(ApiError::already_processed());
        }
        self.accesses
            .add_role_tx(
                &mut tx,
                user_id,
                invitation.applet_id,
                owner_id,
                Some(invitation.invitor_id),
                role,
                &meta,
            )
            .await?;
        tx.commit().await?;

        info!(invitation_id = %invitation.id, user_id = %user_id, role = %role,
              "Invitation accepted");
        self.to_response(invitation, InvitationStatus::Approved).await
    }

    /// Declines a pending invitation addressed to the caller's email.
    pub async fn decline(&self, user_id: Uuid, key: Uuid) -> Result<InvitationResponse, ApiError> {
        let invitation = self.find_for_invitee(user_id, key).await?;
        if invitation.status != InvitationStatus::Pending.as_str() {
            return Err(ApiError::already_processed());
        }

        let mut tx = self.pool.begin().await?;
        if !self
            .invitations
            .mark_processed_tx(&mut tx, invitation.id, InvitationStatus::Declined)
            .await?
        {
            return Err(ApiError::already_processed());
        }
        tx.commit().await?;

        info!(invitation_id = %invitation.id, user_id = %user_id, "Invitation declined");
        self.to_response(invitation, InvitationStatus::Declined).await
    }

    /// Invitation details for its invitee, looked up by key.
    pub async fn get_by_key(&self, user_id: Uuid, key: Uuid) -> Result<InvitationResponse, ApiError> {
        let invitation = self.find_for_invitee(user_id, key).await?;
        let status = parse_status(&invitation.status)?;
        self.to_response(invitation, status).await
    }

    /// Pending invitations the caller has sent, newest first.
    pub async fn list_pending(
        &self,
        invitor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<InvitationResponse>, i64), ApiError> {
        let entities = self
            .invitations
            .list_pending_by_invitor(invitor_id, limit, offset)
            .await?;
        let total = self.invitations.count_pending_by_invitor(invitor_id).await?;
        let mut responses = Vec::with_capacity(entities.len());
        for entity in entities {
            let status = parse_status(&entity.status)?;
            responses.push(self.to_response(entity, status).await?);
        }
        Ok((responses, total))
    }

    /// Verifies the caller may invite the given role: an inviter role on the
    /// applet, ranked at or above the role being handed out.
    async fn check_inviter(
        &self,
        invitor_id: Uuid,
        applet_id: Uuid,
        invited: Role,
    ) -> Result<(), ApiError> {
        if !self.accesses.can_invite(applet_id, invitor_id).await? {
            return Err(ApiError::Forbidden("Inviting not allowed".into()));
        }
        let own = self
            .accesses
            .applet_priority_role(applet_id, invitor_id)
            .await?
            .ok_or_else(|| ApiError::Forbidden("Inviting not allowed".into()))?;
        if own.priority() > invited.priority() {
            return Err(ApiError::Forbidden(format!(
                "Cannot invite a role above your own: {invited}"
            )));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn issue(
        &self,
        invitor_id: Uuid,
        applet_id: Uuid,
        role: Role,
        email: &str,
        first_name: &str,
        last_name: &str,
        meta: serde_json::Value,
    ) -> Result<InvitationResponse, ApiError> {
        if self.invitations.has_approved(email, applet_id, role).await? {
            return Err(ApiError::Conflict(
                "An invitation for this role was already accepted".into(),
            ));
        }

        let key = Uuid::new_v4();
        let entity = match self
            .invitations
            .find_pending_by_email_applet_role(email, applet_id, role)
            .await?
        {
            Some(pending) => self
                .invitations
                .refresh_pending(pending.id, key, invitor_id, first_name, last_name, meta)
                .await?
                .ok_or_else(|| ApiError::already_processed())?,
            None => {
                self.invitations
                    .create(email, applet_id, role, key, invitor_id, first_name, last_name, meta)
                    .await?
            }
        };

        info!(invitation_id = %entity.id, applet_id = %applet_id, role = %role,
              invitor_id = %invitor_id, "Invitation issued");
        self.to_response(entity, InvitationStatus::Pending).await
    }

    /// Loads an invitation by key and checks it is addressed to the caller.
    async fn find_for_invitee(
        &self,
        user_id: Uuid,
        key: Uuid,
    ) -> Result<InvitationEntity, ApiError> {
        let invitation = self
            .invitations
            .find_by_key(key)
            .await?
            .ok_or_else(|| ApiError::NotFound("Invitation not found".into()))?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".into()))?;
        if !invitation.email.eq_ignore_ascii_case(&user.email) {
            return Err(ApiError::NotFound("Invitation not found".into()));
        }
        Ok(invitation)
    }

    async fn to_response(
        &self,
        entity: InvitationEntity,
        status: InvitationStatus,
    ) -> Result<InvitationResponse, ApiError> {
        let role = Role::from_str(&entity.role)
            .map_err(|e| ApiError::Internal(format!("Stored role: {e}")))?;
        let applet_name = self
            .applets
            .find_by_id(entity.applet_id)
            .await?
            .map(|a| a.display_name)
            .unwrap_or_default();
        Ok(InvitationResponse {
            id: entity.id,
            key: entity.key,
            email: entity.email,
            applet_id: entity.applet_id,
            applet_name,
            role,
            status,
            first_name: entity.first_name,
            last_name: entity.last_name,
            created_at: entity.created_at,
        })
    }
}

fn parse_status(status: &str) -> Result<InvitationStatus, ApiError> {
    match status {
        "pending" => Ok(InvitationStatus::Pending),
        "approved" => Ok(InvitationStatus::Approved),
        "declined" => Ok(InvitationStatus::Declined),
        other => Err(ApiError::Internal(format!("Stored status: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("pending").unwrap(), InvitationStatus::Pending);
        assert_eq!(parse_status("approved").unwrap(), InvitationStatus::Approved);
        assert_eq!(parse_status("declined").unwrap(), InvitationStatus::Declined);
        assert!(parse_status("expired").is_err());
    }

    #[test]
    fn test_invitable_roles_exclude_owner_and_respondent() {
        assert!(!Role::invitable_managers().contains(&Role::Owner));
        assert!(!Role::invitable_managers().contains(&Role::Respondent));
        assert!(!Role::invitable_managers().contains(&Role::Reviewer));
    }

    #[test]
    fn test_rank_rule() {
        // A coordinator may invite reviewers and respondents but not managers.
        assert!(Role::Coordinator.priority() <= Role::Reviewer.priority());
        assert!(Role::Coordinator.priority() <= Role::Respondent.priority());
        assert!(Role::Coordinator.priority() > Role::Manager.priority());
    }
}
