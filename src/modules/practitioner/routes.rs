use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::modules::auth::require_auth;
use crate::AppState;

pub fn practitioner_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/data-for-pdf", post(controller::data_for_pdf))
        .route("/import-from-csv", post(controller::import_from_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/all/{page_number}/{page_size}", get(controller::list_practitioners))
        .merge(protected)
}
