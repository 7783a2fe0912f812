use axum::extract::State;
use std::sync::Arc;

use super::model::SyncReport;
use crate::modules::response::ApiResponse;
use crate::services::ingest::IngestError;
use crate::AppState;

// =============================================================================
// GET /task-schedule/update-ingest-data
// =============================================================================

pub async fn update_ingest_data(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<SyncReport>, IngestError> {
    let sync = state.ingest.as_ref().ok_or(IngestError::NotConfigured)?;

    let report = sync.run().await?;

    Ok(ApiResponse::ok("Contact data updated", report))
}
