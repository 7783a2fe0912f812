use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::model::DirectoryUser;
use super::schema::UserFilter;
use crate::modules::response::ErrorResponse;

pub type Result<T> = std::result::Result<T, DirectoryError>;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Read side of the user directory.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn list_users(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<DirectoryUser>>;
    async fn find_user(&self, id: &str) -> Result<Option<DirectoryUser>>;
}

// =============================================================================
// PAGINATION
// =============================================================================

/// 1-based page request; `page_size` is clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Result<Self> {
        if page_number == 0 {
            return Err(DirectoryError::Validation("pageNumber starts at 1".to_string()));
        }
        Ok(Self {
            page_number,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page_number: request.page_number,
            page_size: request.page_size,
            total_pages: total.div_ceil(u64::from(request.page_size)),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DirectoryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for DirectoryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "directory request failed");
            "Something went wrong, please try again later".to_string()
        } else {
            self.to_string()
        };

        ErrorResponse::new(status, message).into_response()
    }
}
