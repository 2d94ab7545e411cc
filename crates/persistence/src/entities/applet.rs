//! Applet and applet history entities.

use chrono::{DateTime, Utc};
use domain::models::{Encryption, LanguageMap, ReportConfiguration};
use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `applets` table. Language-keyed and structured
/// columns are stored as jsonb and decoded on demand.
#[derive(Debug, Clone, FromRow)]
pub struct AppletEntity {
    pub id: Uuid,
    pub display_name: String,
    pub description: serde_json::Value,
    pub about: serde_json::Value,
    pub image: Option<String>,
    pub watermark: Option<String>,
    pub theme_id: Option<Uuid>,
    pub version: String,
    pub report_server_ip: Option<String>,
    pub report_public_key: Option<String>,
    pub report_recipients: serde_json::Value,
    pub report_include_user_id: bool,
    pub report_include_case_id: bool,
    pub report_email_body: Option<String>,
    pub encryption: Option<serde_json::Value>,
    pub link: Option<Uuid>,
    pub require_login: Option<bool>,
    pub retention_period: Option<i32>,
    pub retention_type: Option<String>,
    pub is_published: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppletEntity {
    pub fn description_map(&self) -> LanguageMap {
        decode_language_map(&self.description)
    }

    pub fn about_map(&self) -> LanguageMap {
        decode_language_map(&self.about)
    }

    pub fn encryption_params(&self) -> Option<Encryption> {
        self.encryption
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn report_configuration(&self) -> ReportConfiguration {
        ReportConfiguration {
            report_server_ip: self.report_server_ip.clone(),
            report_public_key: self.report_public_key.clone(),
            report_recipients: serde_json::from_value(self.report_recipients.clone())
                .unwrap_or_default(),
            report_include_user_id: self.report_include_user_id,
            report_include_case_id: self.report_include_case_id,
            report_email_body: self.report_email_body.clone(),
        }
    }
}

/// Row mapping for the append-only `applet_histories` table.
#[derive(Debug, Clone, FromRow)]
pub struct AppletHistoryEntity {
    /// `"{applet_id}_{version}"`, the natural key of a snapshot.
    pub id_version: String,
    pub applet_id: Uuid,
    pub version: String,
    pub user_id: Uuid,
    pub display_name: String,
    pub snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Decodes a jsonb column into an ordered language map, tolerating null.
pub fn decode_language_map(value: &serde_json::Value) -> LanguageMap {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_language_map_null_tolerant() {
        assert!(decode_language_map(&serde_json::Value::Null).is_empty());
        let map = decode_language_map(&serde_json::json!({"en": "Hi", "fr": "Salut"}));
        assert_eq!(map.resolve("de"), "Hi");
    }
}
