use async_trait::async_trait;
use sqlx::{MySql, Pool, QueryBuilder};

use super::interface::{DirectoryStore, Page, PageRequest, Result};
use super::model::DirectoryUser;
use super::schema::UserFilter;

pub const DIRECTORY_COLUMNS: &str = "u.id, u.email, u.name, u.disabled, u.email_verified, \
     m.user_type, m.phone, m.specialty, m.organization, m.city, m.state, m.zip, m.data, \
     m.crm_contact_id, m.crm_lifecycle_stage, m.crm_lead_status, m.crm_engagement, m.crm_synced_at, \
     u.created_at, u.updated_at";

pub const DIRECTORY_FROM: &str = " FROM users u LEFT JOIN user_metadata m ON m.user_id = u.id WHERE 1 = 1";

/// `%term%` with LIKE wildcards in the term escaped.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends the filter as bound `AND` clauses.
pub fn push_user_filters(builder: &mut QueryBuilder<'_, MySql>, filter: &UserFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (u.email LIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.name LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(user_type) = &filter.user_type {
        builder.push(" AND m.user_type = ").push_bind(user_type.clone());
    }

    if let Some(disabled) = filter.disabled {
        builder.push(" AND u.disabled = ").push_bind(disabled);
    }

    if let Some(verified) = filter.email_verified {
        builder.push(" AND u.email_verified = ").push_bind(verified);
    }
}

pub fn push_user_order(builder: &mut QueryBuilder<'_, MySql>, filter: &UserFilter) {
    let sort_by = filter.sort_by.unwrap_or_default();
    let order = filter.sort_order.unwrap_or_default();
    builder
        .push(" ORDER BY ")
        .push(sort_by.column())
        .push(" ")
        .push(order.keyword())
        .push(", u.id ASC");
}

pub fn push_page(builder: &mut QueryBuilder<'_, MySql>, page: PageRequest) {
    builder
        .push(" LIMIT ")
        .push_bind(page.page_size)
        .push(" OFFSET ")
        .push_bind(page.offset());
}

pub struct DirectoryCrud {
    pool: Pool<MySql>,
}

impl DirectoryCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for DirectoryCrud {
    async fn list_users(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<DirectoryUser>> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*)");
        count.push(DIRECTORY_FROM);
        push_user_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<MySql>::new("SELECT ");
        select.push(DIRECTORY_COLUMNS).push(DIRECTORY_FROM);
        push_user_filters(&mut select, filter);
        push_user_order(&mut select, filter);
        push_page(&mut select, page);

        let items = select
            .build_query_as::<DirectoryUser>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total.max(0) as u64, page))
    }

    async fn find_user(&self, id: &str) -> Result<Option<DirectoryUser>> {
        let mut select = QueryBuilder::<MySql>::new("SELECT ");
        select
            .push(DIRECTORY_COLUMNS)
            .push(DIRECTORY_FROM)
            .push(" AND u.id = ")
            .push_bind(id.to_string());

        let user = select
            .build_query_as::<DirectoryUser>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
