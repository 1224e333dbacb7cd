//! Developer profiles, contact submissions and health.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::{Method, StatusCode};
use common::{Auth, TestApp};
use serde_json::{json, Value};

fn developer_body() -> Value {
    json!({
        "name": "Asha Rao",
        "department": "Electronics",
        "avatar": "https://cdn.example.com/asha.png",
        "github": "https://github.com/asharao",
        "batch": "2026",
    })
}

fn contact_body() -> Value {
    json!({
        "name": "Visitor",
        "email": "Visitor@Example.com",
        "department": "Mechanical",
        "projectName": "Drone",
        "projectDetail": "Autonomous mapping drone",
    })
}

#[tokio::test]
async fn developer_crud() {
    let app = TestApp::new();
    let token = app.admin_token("a@x.com").await;

    let anonymous = app
        .post("/api/developers/create", developer_body(), Auth::None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let created = app
        .post("/api/developers/create", developer_body(), Auth::Bearer(&token))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.data()["id"].as_str().unwrap().to_string();
    assert_eq!(created.data()["github"], "https://github.com/asharao");
    assert!(created.data()["linkedin"].is_null());

    let list = app.get("/api/developers", Auth::None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.data().as_array().unwrap().len(), 1);

    let updated = app
        .request(
            Method::PUT,
            &format!("/api/developers/update/{}", id),
            Some(json!({ "batch": "2027", "name": " " })),
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["batch"], "2027");
    assert_eq!(updated.data()["name"], "Asha Rao");

    let view = app
        .get(&format!("/api/developers/view/{}", id), Auth::None)
        .await;
    assert_eq!(view.data()["batch"], "2027");

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/api/developers/delete/{}", id),
            None,
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .get(&format!("/api/developers/view/{}", id), Auth::None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn developer_create_validates_input() {
    let app = TestApp::new();
    let token = app.admin_token("a@x.com").await;

    let missing = app
        .post(
            "/api/developers/create",
            json!({ "name": "Asha Rao" }),
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["message"], "Name and Department are required");

    let mut body = developer_body();
    body["avatar"] = Value::Null;
    let no_avatar = app
        .post("/api/developers/create", body, Auth::Bearer(&token))
        .await;
    assert_eq!(no_avatar.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_avatar.body["message"], "Developer image is required");

    let mut body = developer_body();
    body["email"] = json!("not-an-email");
    let bad_email = app
        .post("/api/developers/create", body, Auth::Bearer(&token))
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let bad_id = app
        .request(
            Method::PUT,
            "/api/developers/update/xyz",
            Some(json!({ "batch": "2027" })),
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contact_submission_is_public_and_review_is_protected() {
    let app = TestApp::new();

    let submitted = app
        .post("/api/contact/create", contact_body(), Auth::None)
        .await;
    assert_eq!(submitted.status, StatusCode::CREATED);
    assert_eq!(submitted.data()["email"], "visitor@example.com");
    assert_eq!(submitted.data()["projectName"], "Drone");
    let id = submitted.data()["id"].as_str().unwrap().to_string();

    assert_eq!(
        app.get("/api/contact", Auth::None).await.status,
        StatusCode::UNAUTHORIZED
    );

    let token = app.admin_token("a@x.com").await;
    let list = app.get("/api/contact", Auth::Bearer(&token)).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.data().as_array().unwrap().len(), 1);

    let view = app
        .get(&format!("/api/contact/view/{}", id), Auth::Bearer(&token))
        .await;
    assert_eq!(view.data()["projectDetail"], "Autonomous mapping drone");

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/api/contact/delete/{}", id),
            None,
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let list = app.get("/api/contact", Auth::Bearer(&token)).await;
    assert!(list.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn contact_submission_validates_fields() {
    let app = TestApp::new();

    let mut body = contact_body();
    body["projectDetail"] = json!("");
    let blank = app.post("/api/contact/create", body, Auth::None).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["message"], "All fields are required");

    let mut body = contact_body();
    body["email"] = json!("visitor@");
    let bad_email = app.post("/api/contact/create", body, Auth::None).await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_store_and_version() {
    let app = TestApp::new();

    let health = app.get("/api/health", Auth::None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["success"], true);
    assert_eq!(health.data()["status"], "healthy");
    assert_eq!(health.data()["store"], "memory: healthy");
    assert_eq!(health.data()["version"], env!("CARGO_PKG_VERSION"));

    let live = app.get("/api/health/live", Auth::None).await;
    assert_eq!(live.status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/api/nope", Auth::None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
