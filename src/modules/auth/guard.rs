use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::interface::{AuthError, CredentialStore};
use crate::services::jwt::Claims;
use crate::AppState;

/// Pulls the token out of a literal `Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::Unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AuthError::Unauthorized("Malformed Authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Unauthorized("Authorization header must be 'Bearer <token>'"))
}

/// Gate for protected routes. Verifies the access token signature and
/// expiry and stores the [`Claims`] in the request extensions. With
/// `guard_check_disabled` it also refuses users that are gone or disabled;
/// otherwise a disabled user keeps access until the token expires.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers())?;

    let claims = state.identity.jwt().verify_access_token(token).map_err(|e| {
        tracing::debug!(error = %e, "access token rejected");
        AuthError::Unauthorized("Invalid or expired token")
    })?;

    if state.guard_check_disabled {
        let active = state
            .identity
            .store()
            .find_by_id(&claims.id)
            .await?
            .is_some_and(|user| !user.disabled);
        if !active {
            return Err(AuthError::Unauthorized("Account is no longer active"));
        }
    }

    request.extensions_mut().insert::<Claims>(claims);
    Ok(next.run(request).await)
}
