use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{test_email, test_password, TestContext};

async fn request_otp(ctx: &TestContext, email: &str) -> String {
    ctx.server
        .post("/auth/resend-otp")
        .json(&json!({ "email": email }))
        .await
        .assert_status(StatusCode::OK);
    ctx.mailer.last_code(email).expect("otp mailed")
}

#[tokio::test]
async fn practitioner_is_sent_to_practitioner_login() {
    let ctx = TestContext::new();
    let email = test_email();
    let user = ctx.add_user(&email, None, |u| {
        u.user_type = Some("practitioner".into());
        u.email_verified = false;
    });
    let otp = request_otp(&ctx, &email).await;

    let stored = ctx.credentials.get(&user.id).unwrap();
    assert_ne!(stored.otp_hash.as_deref(), Some(otp.as_str()));

    let response = ctx
        .server
        .post("/auth/verify-otp")
        .json(&json!({ "email": &email, "otp": &otp }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["screen"], "practitioner-login");
    assert_eq!(body["user"]["emailVerified"], true);
    assert!(body["token"].is_string());
    assert!(body["user"]["refreshToken"].is_string());

    let stored = ctx.credentials.get(&user.id).unwrap();
    assert!(stored.email_verified);
    assert!(stored.otp_hash.is_none());
    assert!(stored.otp_hash_expires_at.is_none());
}

#[tokio::test]
async fn regular_user_is_sent_to_dashboard() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |u| u.email_verified = false);
    let otp = request_otp(&ctx, &email).await;

    let response = ctx
        .server
        .post("/auth/verify-otp")
        .json(&json!({ "email": &email, "otp": &otp }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["screen"], "dashboard");
}

#[tokio::test]
async fn otp_is_single_use() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, None, |u| u.email_verified = false);
    let otp = request_otp(&ctx, &email).await;

    ctx.server
        .post("/auth/verify-otp")
        .json(&json!({ "email": &email, "otp": &otp }))
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .post("/auth/verify-otp")
        .json(&json!({ "email": &email, "otp": &otp }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_otp_is_rejected() {
    let ctx = TestContext::new();
    let email = test_email();
    let user = ctx.add_user(&email, None, |u| u.email_verified = false);
    let otp = request_otp(&ctx, &email).await;
    let wrong = if otp == "999999" { "888888" } else { "999999" };

    ctx.server
        .post("/auth/verify-otp")
        .json(&json!({ "email": &email, "otp": wrong }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    assert!(!ctx.credentials.get(&user.id).unwrap().email_verified);
}

#[tokio::test]
async fn expired_otp_is_rejected() {
    let ctx = TestContext::new();
    let email = test_email();
    let user = ctx.add_user(&email, None, |u| u.email_verified = false);
    let otp = request_otp(&ctx, &email).await;
    ctx.credentials
        .update(&user.id, |u| u.otp_hash_expires_at = Some(Utc::now() - Duration::seconds(1)));

    ctx.server
        .post("/auth/verify-otp")
        .json(&json!({ "email": &email, "otp": &otp }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_without_issued_otp_returns_not_found() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, None, |_| {});

    ctx.server
        .post("/auth/verify-otp")
        .json(&json!({ "email": &email, "otp": "123456" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
