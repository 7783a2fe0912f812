use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySql, Pool, QueryBuilder};
use uuid::Uuid;

use super::interface::PractitionerStore;
use super::model::{ImportOutcome, PractitionerProfile, PractitionerRow};
use super::schema::PractitionerQuery;
use crate::modules::auth::model::PRACTITIONER_USER_TYPE;
use crate::modules::users::crud::{like_pattern, push_page};
use crate::modules::users::interface::{Page, PageRequest, Result};

const PROFILE_SELECT: &str = "SELECT u.id, u.email, u.name, m.phone, m.specialty, m.organization, \
     m.city, m.state, m.zip \
     FROM users u INNER JOIN user_metadata m ON m.user_id = u.id";

/// Restricts to enabled practitioners and applies the listing filters.
pub fn push_practitioner_filters(builder: &mut QueryBuilder<'_, MySql>, query: &PractitionerQuery) {
    builder
        .push(" WHERE m.user_type = ")
        .push_bind(PRACTITIONER_USER_TYPE)
        .push(" AND u.disabled = FALSE");

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (u.name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email LIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.organization LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(specialty) = query.specialty.as_deref().filter(|s| !s.trim().is_empty()) {
        builder.push(" AND m.specialty = ").push_bind(specialty.trim().to_string());
    }

    if let Some(state) = query.state.as_deref().filter(|s| !s.trim().is_empty()) {
        builder.push(" AND m.state = ").push_bind(state.trim().to_string());
    }
}

/// Restores request order and drops ids that matched nothing.
pub fn order_by_ids(ids: &[String], mut profiles: Vec<PractitionerProfile>) -> Vec<PractitionerProfile> {
    let mut ordered = Vec::with_capacity(profiles.len());
    for id in ids {
        if let Some(pos) = profiles.iter().position(|p| &p.id == id) {
            ordered.push(profiles.swap_remove(pos));
        }
    }
    ordered
}

pub struct PractitionerCrud {
    pool: Pool<MySql>,
}

impl PractitionerCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PractitionerStore for PractitionerCrud {
    async fn list_practitioners(
        &self,
        query: &PractitionerQuery,
        page: PageRequest,
    ) -> Result<Page<PractitionerProfile>> {
        let mut count = QueryBuilder::<MySql>::new(
            "SELECT COUNT(*) FROM users u INNER JOIN user_metadata m ON m.user_id = u.id",
        );
        push_practitioner_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<MySql>::new(PROFILE_SELECT);
        push_practitioner_filters(&mut select, query);
        select.push(" ORDER BY u.name ASC, u.id ASC");
        push_page(&mut select, page);

        let items = select
            .build_query_as::<PractitionerProfile>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total.max(0) as u64, page))
    }

    async fn practitioners_by_ids(&self, ids: &[String]) -> Result<Vec<PractitionerProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut select = QueryBuilder::<MySql>::new(PROFILE_SELECT);
        select
            .push(" WHERE m.user_type = ")
            .push_bind(PRACTITIONER_USER_TYPE)
            .push(" AND u.id IN (");
        let mut separated = select.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let profiles = select
            .build_query_as::<PractitionerProfile>()
            .fetch_all(&self.pool)
            .await?;

        Ok(order_by_ids(ids, profiles))
    }

    async fn upsert_practitioner(&self, row: &PractitionerRow) -> Result<ImportOutcome> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT u.id, m.user_type
            FROM users u
            LEFT JOIN user_metadata m ON m.user_id = u.id
            WHERE u.email = ?
            FOR UPDATE
            "#,
        )
        .bind(&row.email)
        .fetch_optional(&mut *tx)
        .await?;

        let (user_id, outcome) = match existing {
            Some((id, Some(user_type))) if user_type == PRACTITIONER_USER_TYPE => {
                sqlx::query("UPDATE users SET name = ?, updated_at = NOW() WHERE id = ?")
                    .bind(&row.name)
                    .bind(&id)
                    .execute(&mut *tx)
                    .await?;
                (id, ImportOutcome::Updated)
            }
            // Accounts of any other kind are never converted by an import.
            Some(_) => return Ok(ImportOutcome::Conflict),
            None => {
                let id = Uuid::new_v4().to_string();
                let now = Utc::now();
                sqlx::query(
                    r#"
                    INSERT INTO users (id, email, password_hash, name, disabled, email_verified, created_at, updated_at)
                    VALUES (?, ?, NULL, ?, FALSE, FALSE, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(&row.email)
                .bind(&row.name)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                (id, ImportOutcome::Created)
            }
        };

        sqlx::query(
            r#"
            INSERT INTO user_metadata (user_id, user_type, phone, specialty, organization, city, state, zip)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                user_type = VALUES(user_type),
                phone = VALUES(phone),
                specialty = VALUES(specialty),
                organization = VALUES(organization),
                city = VALUES(city),
                state = VALUES(state),
                zip = VALUES(zip)
            "#,
        )
        .bind(&user_id)
        .bind(PRACTITIONER_USER_TYPE)
        .bind(&row.phone)
        .bind(&row.specialty)
        .bind(&row.organization)
        .bind(&row.city)
        .bind(&row.state)
        .bind(&row.zip)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(outcome)
    }
}
