use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::modules::auth::require_auth;
use crate::AppState;
use super::controller;

pub fn user_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/all/{page_number}/{page_size}", post(controller::list_users))
        .route("/{id}", get(controller::get_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
