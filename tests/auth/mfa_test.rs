use axum::http::StatusCode;
use chrono::{Duration, Utc};
use practitioner_portal::modules::auth::model::CONSUMED_CODE;
use practitioner_portal::modules::auth::CredentialStore;
use serde_json::json;

use crate::common::{test_email, test_password, TestContext};

async fn signed_in(ctx: &TestContext) -> (String, String) {
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |_| {});
    ctx.server
        .post("/auth/sign-in")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .assert_status(StatusCode::OK);
    let code = ctx.mailer.last_code(&email).expect("code mailed");
    (email, code)
}

#[tokio::test]
async fn valid_code_returns_tokens_once() {
    let ctx = TestContext::new();
    let (email, code) = signed_in(&ctx).await;

    let response = ctx
        .server
        .post("/auth/verify-mfa-code")
        .json(&json!({ "email": &email, "mfaCode": &code }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let access = body["data"]["accessToken"].as_str().expect("access token");
    let refresh = body["data"]["user"]["refreshToken"].as_str().expect("refresh token");
    assert_eq!(body["data"]["user"]["email"], email.as_str());
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let claims = ctx.state.identity.jwt().verify_access_token(access).unwrap();
    assert_eq!(claims.email, email);
    assert!(ctx.state.identity.jwt().verify_refresh_token(refresh).is_ok());

    let stored = ctx.credentials.mfa_code(&email).expect("record kept");
    assert_eq!(stored.code, CONSUMED_CODE);
    assert!(stored.expires_at <= Utc::now());

    let replay = ctx
        .server
        .post("/auth/verify-mfa-code")
        .json(&json!({ "email": &email, "mfaCode": &code }))
        .await;
    replay.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_code_is_rejected_and_right_code_still_works() {
    let ctx = TestContext::new();
    let (email, code) = signed_in(&ctx).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    ctx.server
        .post("/auth/verify-mfa-code")
        .json(&json!({ "email": &email, "mfaCode": wrong }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post("/auth/verify-mfa-code")
        .json(&json!({ "email": &email, "mfaCode": &code }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let ctx = TestContext::new();
    let (email, code) = signed_in(&ctx).await;
    ctx.credentials.age_mfa_code(&email, Duration::minutes(11));

    let response = ctx
        .server
        .post("/auth/verify-mfa-code")
        .json(&json!({ "email": &email, "mfaCode": &code }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn verify_without_pending_code_returns_not_found() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |_| {});

    ctx.server
        .post("/auth/verify-mfa-code")
        .json(&json!({ "email": &email, "mfaCode": "123456" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_disabled_after_sign_in_cannot_finish_mfa() {
    let ctx = TestContext::new();
    let (email, code) = signed_in(&ctx).await;
    let user = ctx.state.identity.store().find_by_email(&email).await.unwrap().unwrap();
    ctx.credentials.update(&user.id, |u| u.disabled = true);

    ctx.server
        .post("/auth/verify-mfa-code")
        .json(&json!({ "email": &email, "mfaCode": &code }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
