//! Ownership transfer service.
//!
//! Accepting a transfer is destructive on purpose: encryption parameters,
//! access grants, invitations, answers and alerts of the applet all belong
//! to the outgoing owner's key material and cannot survive the handover.

use domain::models::{AccessMeta, Role, TransferResponse};
use persistence::entities::TransferEntity;
use persistence::repositories::{
    AlertRepository, AnswerRepository, AppletAccessRepository, AppletRepository,
    InvitationRepository, TransferRepository, UserRepository,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct TransferService {
    pool: PgPool,
    transfers: TransferRepository,
    accesses: AppletAccessRepository,
    applets: AppletRepository,
    invitations: InvitationRepository,
    answers: AnswerRepository,
    alerts: AlertRepository,
    users: UserRepository,
}

impl TransferService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            transfers: TransferRepository::new(pool.clone()),
            accesses: AppletAccessRepository::new(pool.clone()),
            applets: AppletRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            answers: AnswerRepository::new(pool.clone()),
            alerts: AlertRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Starts a transfer. Only the current owner may initiate, and not to
    /// their own address.
    pub async fn initiate(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        email: &str,
    ) -> Result<TransferResponse, ApiError> {
        let owner_id = self
            .accesses
            .get_applet_owner(applet_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Applet not found".into()))?;
        if owner_id != user_id {
            return Err(ApiError::Forbidden("Only the owner can transfer an applet".into()));
        }
        self.applets
            .find_by_id(applet_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Applet not found".into()))?;
        let owner = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".into()))?;
        if owner.email.eq_ignore_ascii_case(email) {
            return Err(ApiError::Validation(
                "Cannot transfer an applet to yourself".into(),
            ));
        }

        let key = Uuid::new_v4();
        let entity = self.transfers.create(email, applet_id, key, user_id).await?;

        info!(transfer_id = %entity.id, applet_id = %applet_id, from_user_id = %user_id,
              "Transfer initiated");
        Ok(to_response(entity))
    }

    /// Completes a transfer addressed to the caller's email. In one
    /// transaction: wipes encryption, accesses, invitations, answers and
    /// alerts, then grants the new owner Owner and Respondent access.
    pub async fn accept(&self, user_id: Uuid, applet_id: Uuid, key: Uuid) -> Result<(), ApiError> {
        let transfer = self.find_for_recipient(user_id, applet_id, key).await?;

        let mut tx = self.pool.begin().await?;

        self.applets.clear_encryption_tx(&mut tx, applet_id).await?;
        self.alerts.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.answers.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.invitations.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.transfers.delete_by_applet_tx(&mut tx, applet_id).await?;
        self.accesses.delete_all_by_applet_tx(&mut tx, applet_id).await?;
        self.accesses
            .add_role_tx(
                &mut tx,
                user_id,
                applet_id,
                user_id,
                None,
                Role::Owner,
                &AccessMeta::default(),
            )
            .await?;
        self.accesses
            .add_role_tx(
                &mut tx,
                user_id,
                applet_id,
                user_id,
                None,
                Role::Respondent,
                &AccessMeta::respondent(Uuid::new_v4().to_string(), None),
            )
            .await?;

        tx.commit().await?;

        info!(transfer_id = %transfer.id, applet_id = %applet_id, new_owner_id = %user_id,
              "Transfer accepted");
        Ok(())
    }

    /// Declines a transfer addressed to the caller's email.
    pub async fn decline(&self, user_id: Uuid, applet_id: Uuid, key: Uuid) -> Result<(), ApiError> {
        let transfer = self.find_for_recipient(user_id, applet_id, key).await?;
        if !self.transfers.delete(transfer.id).await? {
            return Err(ApiError::already_processed());
        }

        info!(transfer_id = %transfer.id, applet_id = %applet_id, user_id = %user_id,
              "Transfer declined");
        Ok(())
    }

    async fn find_for_recipient(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        key: Uuid,
    ) -> Result<TransferEntity, ApiError> {
        let transfer = self
            .transfers
            .find_by_key_and_applet(key, applet_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Transfer not found".into()))?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".into()))?;
        if !transfer.email.eq_ignore_ascii_case(&user.email) {
            return Err(ApiError::NotFound("Transfer not found".into()));
        }
        Ok(transfer)
    }
}

fn to_response(entity: TransferEntity) -> TransferResponse {
    TransferResponse {
        key: entity.key,
        applet_id: entity.applet_id,
        email: entity.email,
        created_at: entity.created_at,
    }
}
