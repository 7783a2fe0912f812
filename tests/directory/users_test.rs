use axum::http::StatusCode;
use serde_json::json;

use crate::common::{directory_user, test_email, TestContext};

fn seeded() -> (TestContext, String) {
    let ctx = TestContext::new();
    {
        let mut users = ctx.directory.users.lock().unwrap();
        for i in 0..25 {
            users.push(directory_user(&format!("u{}", i), &format!("user{}@clinic.io", i), "Member"));
        }
        let mut off = directory_user("off", "off@clinic.io", "Inactive");
        off.disabled = true;
        users.push(off);
    }
    let admin = ctx.add_user(&test_email(), None, |_| {});
    let token = ctx.access_token_for(&admin);
    (ctx, token)
}

#[tokio::test]
async fn list_users_pages_through_results() {
    let (ctx, token) = seeded();

    let response = ctx
        .server
        .post("/users/all/2/10")
        .authorization_bearer(&token)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["total"], 26);
    assert_eq!(body["data"]["pageNumber"], 2);
    assert_eq!(body["data"]["pageSize"], 10);
    assert_eq!(body["data"]["totalPages"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn list_users_applies_filter_body() {
    let (ctx, token) = seeded();

    let response = ctx
        .server
        .post("/users/all/1/50")
        .authorization_bearer(&token)
        .json(&json!({ "disabled": true }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], "off");
}

#[tokio::test]
async fn page_zero_is_a_bad_request() {
    let (ctx, token) = seeded();

    ctx.server
        .post("/users/all/0/10")
        .authorization_bearer(&token)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_page_is_clamped() {
    let (ctx, token) = seeded();

    let response = ctx
        .server
        .post("/users/all/1/5000")
        .authorization_bearer(&token)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["pageSize"], 100);
}

#[tokio::test]
async fn get_user_returns_record_or_not_found() {
    let (ctx, token) = seeded();

    let response = ctx.server.get("/users/u3").authorization_bearer(&token).await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["email"], "user3@clinic.io");
    assert!(body["data"].get("passwordHash").is_none());

    ctx.server
        .get("/users/missing")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directory_requires_a_token() {
    let (ctx, _) = seeded();

    ctx.server
        .post("/users/all/1/10")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn filter_body_is_optional_but_must_parse() {
    let (ctx, token) = seeded();

    let response = ctx
        .server
        .post("/users/all/1/10")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["total"], 26);

    let response = ctx
        .server
        .post("/users/all/1/10")
        .authorization_bearer(&token)
        .json(&json!({ "disabled": "sometimes" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["success"], false);
}
