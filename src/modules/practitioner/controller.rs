use axum::extract::{Multipart, Path, Query, State};
use std::sync::Arc;
use validator::Validate;

use super::import::parse_practitioner_csv;
use super::model::{ImportOutcome, PractitionerProfile};
use super::schema::{ImportReport, PdfDataRequest, PractitionerQuery, SkippedRow};
use crate::modules::extract::JsonBody;
use crate::modules::response::ApiResponse;
use crate::modules::users::interface::{DirectoryError, Page, PageRequest};
use crate::AppState;

pub const UPLOAD_FIELD: &str = "file";

// =============================================================================
// GET /practitioner/all/{pageNumber}/{pageSize}
// =============================================================================

pub async fn list_practitioners(
    State(state): State<Arc<AppState>>,
    Path((page_number, page_size)): Path<(u32, u32)>,
    Query(query): Query<PractitionerQuery>,
) -> Result<ApiResponse<Page<PractitionerProfile>>, DirectoryError> {
    let page = PageRequest::new(page_number, page_size)?;

    let practitioners = state.practitioners.list_practitioners(&query, page).await?;

    Ok(ApiResponse::ok("Practitioners fetched successfully", practitioners))
}

// =============================================================================
// POST /practitioner/data-for-pdf
// =============================================================================

pub async fn data_for_pdf(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<PdfDataRequest>,
) -> Result<ApiResponse<Vec<PractitionerProfile>>, DirectoryError> {
    req.validate()?;

    let profiles = state.practitioners.practitioners_by_ids(&req.ids).await?;

    Ok(ApiResponse::ok("Practitioner data fetched successfully", profiles))
}

// =============================================================================
// POST /practitioner/import-from-csv
// =============================================================================

pub async fn import_from_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<ApiResponse<ImportReport>, DirectoryError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DirectoryError::Validation(format!("Invalid upload: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| DirectoryError::Validation(format!("Invalid upload: {}", e)))?;
            upload = Some(bytes);
            break;
        }
    }

    let data = upload.ok_or_else(|| {
        DirectoryError::Validation(format!("Missing '{}' field in upload", UPLOAD_FIELD))
    })?;

    let parsed = parse_practitioner_csv(&data)?;
    let mut report = ImportReport {
        skipped: parsed.skipped,
        ..ImportReport::default()
    };

    for (line, row) in parsed.rows {
        match state.practitioners.upsert_practitioner(&row).await {
            Ok(ImportOutcome::Created) => report.created += 1,
            Ok(ImportOutcome::Updated) => report.updated += 1,
            Ok(ImportOutcome::Conflict) => report.skipped.push(SkippedRow {
                line,
                email: Some(row.email),
                reason: "Email belongs to a non-practitioner account".to_string(),
            }),
            Err(e) => {
                tracing::error!(line, email = %row.email, error = %e, "practitioner import row failed");
                report.skipped.push(SkippedRow {
                    line,
                    email: Some(row.email),
                    reason: "Row could not be saved".to_string(),
                });
            }
        }
    }
    report.skipped.sort_by_key(|s| s.line);

    tracing::info!(
        created = report.created,
        updated = report.updated,
        skipped = report.skipped.len(),
        "practitioner import finished"
    );

    Ok(ApiResponse::ok("Practitioners imported", report))
}
