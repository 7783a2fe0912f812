use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use serde_json::json;

use crate::common::{test_email, test_password, ContextOptions, TestContext};

async fn sign_in_fully(ctx: &TestContext, email: &str, password: &str) -> serde_json::Value {
    ctx.server
        .post("/auth/sign-in")
        .json(&json!({ "email": email, "password": password }))
        .await
        .assert_status(StatusCode::OK);
    let code = ctx.mailer.last_code(email).expect("code mailed");

    let response = ctx
        .server
        .post("/auth/verify-mfa-code")
        .json(&json!({ "email": email, "mfaCode": code }))
        .await;
    response.assert_status(StatusCode::OK);
    response.json()
}

#[tokio::test]
async fn guard_leaves_public_routes_open_and_protects_the_rest() {
    let ctx = TestContext::new();

    ctx.server.get("/practitioner/all/1/10").await.assert_status(StatusCode::OK);
    ctx.server.get("/health").await.assert_status(StatusCode::OK);

    let response = ctx
        .server
        .post("/auth/reset-password")
        .json(&json!({ "oldPassword": "a", "newPassword": "bbbbbb" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);

    ctx.server
        .get("/users/some-id")
        .authorization_bearer("not.a.jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .get("/users/some-id")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Token abc"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_access_token() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |_| {});
    let body = sign_in_fully(&ctx, &email, test_password()).await;
    let refresh = body["data"]["user"]["refreshToken"].as_str().unwrap();

    ctx.server
        .get("/users/some-id")
        .authorization_bearer(refresh)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_issues_a_new_pair() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |_| {});
    let body = sign_in_fully(&ctx, &email, test_password()).await;
    let refresh = body["data"]["user"]["refreshToken"].as_str().unwrap();

    let response = ctx
        .server
        .post("/auth/refresh-token")
        .json(&json!({ "refreshToken": refresh }))
        .await;
    response.assert_status(StatusCode::OK);
    let pair: serde_json::Value = response.json();
    let access = pair["data"]["accessToken"].as_str().unwrap();
    assert!(ctx.state.identity.jwt().verify_access_token(access).is_ok());

    let access_as_refresh = body["data"]["accessToken"].as_str().unwrap();
    ctx.server
        .post("/auth/refresh-token")
        .json(&json!({ "refreshToken": access_as_refresh }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sign_in_then_reset_password_end_to_end() {
    let ctx = TestContext::new();
    let email = test_email();
    ctx.add_user(&email, Some(test_password()), |_| {});

    let body = sign_in_fully(&ctx, &email, test_password()).await;
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();

    ctx.server
        .post("/auth/reset-password")
        .authorization_bearer(&access)
        .json(&json!({ "oldPassword": test_password(), "newPassword": "N3wPass!" }))
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .post("/auth/sign-in")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    sign_in_fully(&ctx, &email, "N3wPass!").await;
}

#[tokio::test]
async fn reset_password_enforces_policy_and_old_password() {
    let ctx = TestContext::new();
    let email = "sam@clinic.io";
    let user = ctx.add_user(email, Some(test_password()), |u| u.name = "Sam".into());
    let token = ctx.access_token_for(&user);

    let attempt = |old: &'static str, new: &'static str| {
        ctx.server
            .post("/auth/reset-password")
            .authorization_bearer(&token)
            .json(&json!({ "oldPassword": old, "newPassword": new }))
    };

    attempt(test_password(), "xxSAMxx").await.assert_status(StatusCode::BAD_REQUEST);
    attempt(test_password(), "sam@clinic.io").await.assert_status(StatusCode::BAD_REQUEST);
    attempt(test_password(), "abc").await.assert_status(StatusCode::BAD_REQUEST);
    attempt(test_password(), "this-is-way-too-long").await.assert_status(StatusCode::BAD_REQUEST);
    attempt("not-my-password", "G00dPass").await.assert_status(StatusCode::UNAUTHORIZED);

    let unchanged = ctx.credentials.get(&user.id).unwrap();
    assert_eq!(unchanged.password_hash, user.password_hash);
}

#[tokio::test]
async fn disabled_user_check_in_guard_is_optional() {
    let email = test_email();

    let lenient = TestContext::new();
    let user = lenient.add_user(&email, Some(test_password()), |u| u.disabled = true);
    lenient
        .server
        .post("/auth/reset-password")
        .authorization_bearer(&lenient.access_token_for(&user))
        .json(&json!({ "oldPassword": test_password(), "newPassword": "G00dPass" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let strict = TestContext::with_options(ContextOptions {
        guard_check_disabled: true,
        ..ContextOptions::default()
    });
    let user = strict.add_user(&email, Some(test_password()), |u| u.disabled = true);
    strict
        .server
        .post("/auth/reset-password")
        .authorization_bearer(&strict.access_token_for(&user))
        .json(&json!({ "oldPassword": test_password(), "newPassword": "G00dPass" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
