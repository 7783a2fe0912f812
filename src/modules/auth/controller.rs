use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use validator::Validate;

use crate::modules::auth::{
    interface::AuthError,
    schema::{
        PractitionerLoginRequest, PractitionerLoginVerificationRequest, RefreshTokenRequest,
        ResendOtpRequest, ResetPasswordRequest, SessionData, SignInData, SignInRequest,
        TokenPairData, UserResponse, VerifyMfaCodeData, VerifyMfaCodeRequest, VerifyOtpRequest,
        VerifyOtpResponse,
    },
};
use crate::modules::extract::JsonBody;
use crate::modules::response::ApiResponse;
use crate::services::jwt::Claims;
use crate::AppState;

type AuthResult<T> = Result<T, AuthError>;

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SignInRequest>,
) -> AuthResult<ApiResponse<SignInData>> {
    req.validate()?;

    state.identity.sign_in(&req.email, &req.password).await?;

    Ok(ApiResponse::ok(
        "A verification code has been sent to your email",
        SignInData { set_mfa: true },
    ))
}

pub async fn verify_mfa_code(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<VerifyMfaCodeRequest>,
) -> AuthResult<ApiResponse<VerifyMfaCodeData>> {
    req.validate()?;

    let session = state.identity.verify_mfa_code(&req.email, &req.mfa_code).await?;

    Ok(ApiResponse::ok(
        "Signed in successfully",
        VerifyMfaCodeData {
            user: UserResponse::from(session.user).with_refresh_token(session.tokens.refresh_token),
            access_token: session.tokens.access_token,
        },
    ))
}

pub async fn practitioner_login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<PractitionerLoginRequest>,
) -> AuthResult<ApiResponse<()>> {
    req.validate()?;

    state.identity.practitioner_sign_in(&req.email).await?;

    Ok(ApiResponse::message("A login link has been sent to your email"))
}

pub async fn practitioner_login_verification(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<PractitionerLoginVerificationRequest>,
) -> AuthResult<ApiResponse<SessionData>> {
    req.validate()?;

    let session = state
        .identity
        .practitioner_login_verification(&req.email, req.timestamp, req.signature.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        "Signed in successfully",
        SessionData {
            user: session.user.into(),
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        },
    ))
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<VerifyOtpRequest>,
) -> AuthResult<Json<VerifyOtpResponse>> {
    req.validate()?;

    let (session, screen) = state.identity.verify_otp(&req.email, &req.otp).await?;

    Ok(Json(VerifyOtpResponse {
        status_code: StatusCode::OK.as_u16(),
        message: "Email verified successfully".to_string(),
        token: session.tokens.access_token,
        user: UserResponse::from(session.user).with_refresh_token(session.tokens.refresh_token),
        screen: screen.as_str(),
    }))
}

pub async fn resend_otp(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ResendOtpRequest>,
) -> AuthResult<ApiResponse<()>> {
    req.validate()?;

    state.identity.issue_otp(&req.email).await?;

    Ok(ApiResponse::message("A one-time password has been sent to your email"))
}

pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RefreshTokenRequest>,
) -> AuthResult<ApiResponse<TokenPairData>> {
    req.validate()?;

    let tokens = state.identity.refresh(&req.refresh_token).await?;

    Ok(ApiResponse::ok(
        "Tokens refreshed",
        TokenPairData {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        },
    ))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<ResetPasswordRequest>,
) -> AuthResult<ApiResponse<()>> {
    req.validate()?;

    state
        .identity
        .reset_password(&claims.id, &req.old_password, &req.new_password)
        .await?;

    Ok(ApiResponse::message("Password updated successfully"))
}
