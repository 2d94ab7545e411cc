//! Alert models.
//!
//! Alerts notify reviewers about flagged respondent answers. They stay
//! unwatched until a reviewer marks them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Alert as listed for a reviewer, with applet context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AlertResponse {
    pub id: Uuid,
    pub applet_id: Uuid,
    pub applet_name: String,
    pub respondent_id: Uuid,
    pub secret_user_id: Option<String>,
    pub message: String,
    pub is_watched: bool,
    pub created_at: DateTime<Utc>,
}
