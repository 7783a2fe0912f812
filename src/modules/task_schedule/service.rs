use chrono::Utc;
use std::sync::Arc;

use super::interface::IngestStore;
use super::model::{CrmUpdate, SyncReport};
use crate::services::ingest::{ContactSource, IngestError};

/// Pulls every contact page from the CRM and mirrors the derived fields
/// onto matching local users.
pub struct IngestSynchronizer {
    source: Arc<dyn ContactSource>,
    store: Arc<dyn IngestStore>,
}

impl IngestSynchronizer {
    pub fn new(source: Arc<dyn ContactSource>, store: Arc<dyn IngestStore>) -> Self {
        Self { source, store }
    }

    /// A source error stops the run; store errors only fail their record.
    pub async fn run(&self) -> Result<SyncReport, IngestError> {
        let mut report = SyncReport::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .source
                .fetch_page(cursor.as_deref())
                .await
                .inspect_err(|e| {
                    tracing::error!(error = %e, ?report, "contact sync aborted");
                })?;

            let now = Utc::now();
            for contact in &page.results {
                report.fetched += 1;

                let Some(update) = CrmUpdate::from_contact(contact, now) else {
                    report.skipped += 1;
                    continue;
                };

                match self.store.apply_crm_update(&update).await {
                    Ok(true) => report.updated += 1,
                    Ok(false) => report.skipped += 1,
                    Err(e) => {
                        tracing::warn!(contact_id = %contact.id, email = %update.email, error = %e, "contact update failed");
                        report.failed += 1;
                    }
                }
            }

            match page.next_cursor() {
                Some(next) if cursor.as_deref() != Some(next) => cursor = Some(next.to_string()),
                Some(next) => {
                    tracing::warn!(cursor = next, "CRM repeated a paging cursor, stopping");
                    break;
                }
                None => break,
            }
        }

        tracing::info!(
            fetched = report.fetched,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "contact sync finished"
        );

        Ok(report)
    }
}
