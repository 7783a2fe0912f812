use async_trait::async_trait;

use super::model::{ImportOutcome, PractitionerProfile, PractitionerRow};
use super::schema::PractitionerQuery;
use crate::modules::users::interface::{Page, PageRequest, Result};

#[async_trait]
pub trait PractitionerStore: Send + Sync {
    /// Enabled practitioners only.
    async fn list_practitioners(
        &self,
        query: &PractitionerQuery,
        page: PageRequest,
    ) -> Result<Page<PractitionerProfile>>;

    /// Profiles in the order of `ids`; unknown ids are left out.
    async fn practitioners_by_ids(&self, ids: &[String]) -> Result<Vec<PractitionerProfile>>;

    /// Creates or updates the user and its practitioner metadata atomically.
    async fn upsert_practitioner(&self, row: &PractitionerRow) -> Result<ImportOutcome>;
}
