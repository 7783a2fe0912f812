use axum::extract::{Path, State};
use std::sync::Arc;

use super::interface::{DirectoryError, Page, PageRequest};
use super::model::DirectoryUser;
use super::schema::UserFilter;
use crate::modules::extract::JsonBody;
use crate::modules::response::ApiResponse;
use crate::AppState;

// =============================================================================
// POST /users/all/{pageNumber}/{pageSize}
// =============================================================================

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Path((page_number, page_size)): Path<(u32, u32)>,
    filter: Option<JsonBody<UserFilter>>,
) -> Result<ApiResponse<Page<DirectoryUser>>, DirectoryError> {
    let page = PageRequest::new(page_number, page_size)?;
    let filter = filter.map(|JsonBody(f)| f).unwrap_or_default();

    let users = state.directory.list_users(&filter, page).await?;

    Ok(ApiResponse::ok("Users fetched successfully", users))
}

// =============================================================================
// GET /users/{id}
// =============================================================================

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DirectoryUser>, DirectoryError> {
    let user = state
        .directory
        .find_user(&id)
        .await?
        .ok_or(DirectoryError::NotFound("User not found"))?;

    Ok(ApiResponse::ok("User fetched successfully", user))
}
