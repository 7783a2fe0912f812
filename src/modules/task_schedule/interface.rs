use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::model::CrmUpdate;
use crate::modules::response::ErrorResponse;
use crate::services::ingest::IngestError;

#[async_trait]
pub trait IngestStore: Send + Sync {
    /// Writes CRM fields for the user with `update.email`. Returns `false`
    /// when no such user exists.
    async fn apply_crm_update(&self, update: &CrmUpdate) -> Result<bool, IngestError>;
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Http(_) | Self::Parse(_) | Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            Self::NotConfigured => self.to_string(),
            _ => {
                tracing::error!(error = %self, "ingest request failed");
                "Contact sync failed, please try again later".to_string()
            }
        };

        ErrorResponse::new(status, message).into_response()
    }
}
