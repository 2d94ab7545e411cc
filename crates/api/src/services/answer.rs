//! Answer submission service.

use domain::models::{Answer, Role, SubmitAnswerRequest};
use persistence::repositories::{AlertRepository, AnswerRepository, AppletAccessRepository};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AnswerService {
    pool: PgPool,
    answers: AnswerRepository,
    alerts: AlertRepository,
    accesses: AppletAccessRepository,
}

impl AnswerService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            answers: AnswerRepository::new(pool.clone()),
            alerts: AlertRepository::new(pool.clone()),
            accesses: AppletAccessRepository::new(pool.clone()),
            pool,
        }
    }

    /// Stores an answer and its client-raised alerts in one transaction.
    /// Only respondents of the applet may submit.
    pub async fn submit(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        request: SubmitAnswerRequest,
    ) -> Result<Answer, ApiError> {
        if !self
            .accesses
            .has_any_role(applet_id, user_id, &[Role::Respondent])
            .await?
        {
            return Err(ApiError::Forbidden("Respondent access required".into()));
        }
        if request.activity_id.is_none() && request.flow_id.is_none() {
            return Err(ApiError::Validation(
                "Either activity_id or flow_id is required".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let entity = self
            .answers
            .insert_tx(
                &mut tx,
                applet_id,
                user_id,
                request.activity_id,
                request.flow_id,
                request.answer.clone(),
                &request.version,
            )
            .await?;
        for alert in &request.alerts {
            self.alerts
                .insert_tx(&mut tx, applet_id, user_id, alert.activity_item_id, &alert.message)
                .await?;
        }

        tx.commit().await?;

        info!(answer_id = %entity.id, applet_id = %applet_id, respondent_id = %user_id,
              alerts = request.alerts.len(), "Answer submitted");
        Ok(Answer {
            id: entity.id,
            applet_id: entity.applet_id,
            respondent_id: entity.respondent_id,
            activity_id: entity.activity_id,
            flow_id: entity.flow_id,
            answer: entity.answer,
            version: entity.version,
            created_at: entity.created_at,
        })
    }

    /// Answers on an applet, visible to roles cleared for all respondent
    /// data.
    pub async fn list(
        &self,
        user_id: Uuid,
        applet_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Answer>, i64), ApiError> {
        if !self.accesses.can_see_any_data(applet_id, user_id).await? {
            return Err(ApiError::Forbidden("Data access not allowed".into()));
        }
        let entities = self.answers.list_by_applet(applet_id, limit, offset).await?;
        let total = self.answers.count_by_applet(applet_id).await?;
        let answers = entities
            .into_iter()
            .map(|e| Answer {
                id: e.id,
                applet_id: e.applet_id,
                respondent_id: e.respondent_id,
                activity_id: e.activity_id,
                flow_id: e.flow_id,
                answer: e.answer,
                version: e.version,
                created_at: e.created_at,
            })
            .collect();
        Ok((answers, total))
    }
}
