use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// User joined with its metadata, as listed by the directory.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub disabled: bool,
    pub email_verified: bool,
    pub user_type: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub organization: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub data: Option<serde_json::Value>,
    pub crm_contact_id: Option<String>,
    pub crm_lifecycle_stage: Option<String>,
    pub crm_lead_status: Option<String>,
    pub crm_engagement: Option<String>,
    pub crm_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
