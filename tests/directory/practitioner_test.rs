use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use practitioner_portal::modules::practitioner::model::PractitionerProfile;
use serde_json::json;

use crate::common::{test_email, TestContext};

fn profile(id: &str, specialty: &str, state: &str) -> PractitionerProfile {
    PractitionerProfile {
        id: id.to_string(),
        email: format!("{}@clinic.io", id),
        name: format!("Dr {}", id),
        phone: None,
        specialty: Some(specialty.to_string()),
        organization: None,
        city: None,
        state: Some(state.to_string()),
        zip: None,
    }
}

fn authed() -> (TestContext, String) {
    let ctx = TestContext::new();
    ctx.practitioners.profiles.lock().unwrap().extend([
        profile("p1", "Cardiology", "TX"),
        profile("p2", "Dermatology", "TX"),
        profile("p3", "Cardiology", "CA"),
    ]);
    let admin = ctx.add_user(&test_email(), None, |_| {});
    let token = ctx.access_token_for(&admin);
    (ctx, token)
}

fn csv_upload(csv: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(csv.as_bytes().to_vec())
            .file_name("practitioners.csv")
            .mime_type("text/csv"),
    )
}

#[tokio::test]
async fn public_listing_filters_by_query() {
    let (ctx, _) = authed();

    let response = ctx
        .server
        .get("/practitioner/all/1/10")
        .add_query_param("specialty", "Cardiology")
        .add_query_param("state", "TX")
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], "p1");
}

#[tokio::test]
async fn pdf_data_keeps_request_order() {
    let (ctx, token) = authed();

    let response = ctx
        .server
        .post("/practitioner/data-for-pdf")
        .authorization_bearer(&token)
        .json(&json!({ "ids": ["p3", "nope", "p1"] }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["p3", "p1"]);
}

#[tokio::test]
async fn pdf_data_validates_id_count() {
    let (ctx, token) = authed();

    ctx.server
        .post("/practitioner/data-for-pdf")
        .authorization_bearer(&token)
        .json(&json!({ "ids": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let too_many: Vec<String> = (0..101).map(|i| i.to_string()).collect();
    ctx.server
        .post("/practitioner/data-for-pdf")
        .authorization_bearer(&token)
        .json(&json!({ "ids": too_many }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pdf_data_and_import_require_a_token() {
    let (ctx, _) = authed();

    ctx.server
        .post("/practitioner/data-for-pdf")
        .json(&json!({ "ids": ["p1"] }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post("/practitioner/import-from-csv")
        .multipart(csv_upload("email,name\nnew@clinic.io,New\n"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn csv_import_reports_created_updated_and_skipped() {
    let (ctx, token) = authed();
    ctx.practitioners
        .other_accounts
        .lock()
        .unwrap()
        .push("admin@clinic.io".to_string());

    let csv = "email,name,specialty,state\n\
               p1@clinic.io,Dr One Renamed,Cardiology,TX\n\
               new@clinic.io,Dr New,Pediatrics,NY\n\
               admin@clinic.io,Not A Doctor,,\n\
               broken,Dr Broken,,\n";

    let response = ctx
        .server
        .post("/practitioner/import-from-csv")
        .authorization_bearer(&token)
        .multipart(csv_upload(csv))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["created"], 1);
    assert_eq!(body["data"]["updated"], 1);

    let skipped = body["data"]["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 2);
    assert_eq!(skipped[0]["line"], 4);
    assert_eq!(skipped[0]["email"], "admin@clinic.io");
    assert_eq!(skipped[1]["line"], 5);

    let profiles = ctx.practitioners.profiles.lock().unwrap();
    let renamed = profiles.iter().find(|p| p.id == "p1").unwrap();
    assert_eq!(renamed.name, "Dr One Renamed");
    assert!(profiles.iter().any(|p| p.email == "new@clinic.io"));
}

#[tokio::test]
async fn csv_without_required_column_is_rejected() {
    let (ctx, token) = authed();

    let response = ctx
        .server
        .post("/practitioner/import-from-csv")
        .authorization_bearer(&token)
        .multipart(csv_upload("email,phone\np9@clinic.io,555\n"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.practitioners.profiles.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let (ctx, token) = authed();

    let form = MultipartForm::new().add_text("note", "no file here");
    ctx.server
        .post("/practitioner/import-from-csv")
        .authorization_bearer(&token)
        .multipart(form)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
