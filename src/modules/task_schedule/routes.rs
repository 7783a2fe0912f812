use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use super::controller;
use crate::modules::auth::require_auth;
use crate::AppState;

pub fn task_schedule_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/update-ingest-data", get(controller::update_ingest_data))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
