use async_trait::async_trait;
use sqlx::{MySql, Pool};

use super::interface::IngestStore;
use super::model::CrmUpdate;
use crate::services::ingest::IngestError;

pub struct IngestCrud {
    pool: Pool<MySql>,
}

impl IngestCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngestStore for IngestCrud {
    async fn apply_crm_update(&self, update: &CrmUpdate) -> Result<bool, IngestError> {
        let user_id: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(&update.email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user_id) = user_id else {
            return Ok(false);
        };

        sqlx::query(
            r#"
            INSERT INTO user_metadata
                (user_id, crm_contact_id, crm_lifecycle_stage, crm_lead_status, crm_engagement, crm_synced_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                crm_contact_id = VALUES(crm_contact_id),
                crm_lifecycle_stage = VALUES(crm_lifecycle_stage),
                crm_lead_status = VALUES(crm_lead_status),
                crm_engagement = VALUES(crm_engagement),
                crm_synced_at = VALUES(crm_synced_at)
            "#,
        )
        .bind(&user_id)
        .bind(&update.contact_id)
        .bind(&update.lifecycle_stage)
        .bind(&update.lead_status)
        .bind(update.engagement.as_str())
        .bind(update.synced_at)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }
}
