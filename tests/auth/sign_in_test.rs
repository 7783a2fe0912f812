use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{test_email, test_password, TestContext};

#[tokio::test]
async fn sign_in_emails_code_valid_for_ten_minutes() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |_| {});

    let before = Utc::now();
    let response = ctx
        .server
        .post("/auth/sign-in")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;
    let after = Utc::now();

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["setMfa"], true);

    let stored = ctx.credentials.mfa_code(&email).expect("code stored");
    assert_eq!(ctx.mailer.last_code(&email), Some(stored.code.clone()));
    assert_eq!(stored.code.len(), 6);
    assert!(stored.expires_at >= before + Duration::minutes(10));
    assert!(stored.expires_at <= after + Duration::minutes(10));
}

#[tokio::test]
async fn sign_in_replaces_previous_code() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |_| {});

    for _ in 0..2 {
        ctx.server
            .post("/auth/sign-in")
            .json(&json!({ "email": &email, "password": test_password() }))
            .await
            .assert_status(StatusCode::OK);
    }

    let stored = ctx.credentials.mfa_code(&email).unwrap();
    assert_eq!(ctx.mailer.last_code(&email), Some(stored.code));
    assert_eq!(ctx.mailer.sent().len(), 2);
}

#[tokio::test]
async fn sign_in_with_wrong_password_returns_unauthorized() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |_| {});

    let response = ctx
        .server
        .post("/auth/sign-in")
        .json(&json!({ "email": &email, "password": "WrongPassword1" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 401);
    assert!(ctx.credentials.mfa_code(&email).is_none());
    assert!(ctx.mailer.sent().is_empty());
}

#[tokio::test]
async fn sign_in_with_unknown_email_returns_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/auth/sign-in")
        .json(&json!({ "email": "nobody@example.com", "password": test_password() }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sign_in_email_match_is_case_sensitive() {
    let ctx = TestContext::new();
    ctx.add_user("Jordan@Example.com", Some(test_password()), |_| {});

    ctx.server
        .post("/auth/sign-in")
        .json(&json!({ "email": "jordan@example.com", "password": test_password() }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disabled_user_cannot_sign_in_even_with_right_password() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |u| u.disabled = true);

    let response = ctx
        .server
        .post("/auth/sign-in")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(ctx.credentials.mfa_code(&email).is_none());
    assert!(ctx.mailer.sent().is_empty());
}

#[tokio::test]
async fn sign_in_rejects_malformed_body() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/auth/sign-in")
        .json(&json!({ "email": "not-an-email", "password": test_password() }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn incomplete_body_uses_error_envelope() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/auth/sign-in")
        .json(&json!({ "email": test_email() }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn unparseable_body_uses_error_envelope() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/auth/sign-in")
        .bytes("{\"email\": ".into())
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);

    let response = ctx.server.post("/auth/sign-in").text("email=a@b.c").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}
