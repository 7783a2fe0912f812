use axum::{middleware, routing::post, Router};
use std::sync::Arc;

use crate::services::rate_limit::{create_rate_limiter, spawn_pruner, RateLimitLayer, PRUNE_INTERVAL};
use crate::AppState;
use super::{controller, guard::require_auth};

/// Sustained rate per client once the burst is spent.
const AUTH_REQUESTS_PER_MINUTE: u32 = 10;

pub fn auth_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/reset-password", post(controller::reset_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let limiter = create_rate_limiter(state.auth_rate_limit_burst, AUTH_REQUESTS_PER_MINUTE);
    spawn_pruner(&limiter, PRUNE_INTERVAL);

    Router::new()
        .route("/sign-in", post(controller::sign_in))
        .route("/verify-mfa-code", post(controller::verify_mfa_code))
        .route("/practitioner-login", post(controller::practitioner_login))
        .route(
            "/practitioner-login-verification",
            post(controller::practitioner_login_verification),
        )
        .route("/verify-otp", post(controller::verify_otp))
        .route("/resend-otp", post(controller::resend_otp))
        .route("/refresh-token", post(controller::refresh_token))
        .merge(protected)
        .layer(RateLimitLayer::new(limiter, state.trust_forwarded_for))
}
