//! Web API Profile Tests

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use common::{bearer, create_test_app, token_for};
use serde_json::{json, Value};

#[tokio::test]
async fn test_my_profile_defaults() {
    let app = create_test_app().await;
    let user = app.seed_user("Asha", "asha@ku.edu.np", "Secret1!").await;

    let response = app
        .server
        .get("/api/profile/me")
        .add_header(AUTHORIZATION, bearer(&token_for("asha@ku.edu.np")))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let profile = &body["data"];
    assert_eq!(profile["id"], user.id.as_str());
    assert_eq!(profile["name"], "Asha");
    assert_eq!(profile["university"], "Kathmandu University");
    assert_eq!(profile["title"], "");
    assert_eq!(profile["bio"], "");
    assert_eq!(profile["research_interests"], json!([]));
}

#[tokio::test]
async fn test_my_profile_requires_session() {
    let app = create_test_app().await;

    let response = app.server.get("/api/profile/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_my_profile_unknown_session_user() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/api/profile/me")
        .add_header(AUTHORIZATION, bearer(&token_for("ghost@ku.edu.np")))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_my_profile() {
    let app = create_test_app().await;
    let user = app.seed_user("Asha", "asha@ku.edu.np", "Secret1!").await;
    let auth = bearer(&token_for("asha@ku.edu.np"));

    let response = app
        .server
        .put("/api/profile/me")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&json!({
            "title": "Lecturer",
            "department": "Computer Science",
            "research_interests": ["NLP", " Robotics "]
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "Lecturer");
    assert_eq!(body["data"]["research_interests"], json!(["NLP", "Robotics"]));

    // Partial update keeps earlier fields
    app.server
        .put("/api/profile/me")
        .add_header(AUTHORIZATION, auth)
        .json(&json!({"bio": "Works on Nepali NLP"}))
        .await
        .assert_status_ok();

    let body: Value = app
        .server
        .get(&format!("/api/users/{}/profile", user.id))
        .await
        .json();
    assert_eq!(body["data"]["title"], "Lecturer");
    assert_eq!(body["data"]["department"], "Computer Science");
    assert_eq!(body["data"]["bio"], "Works on Nepali NLP");
}

#[tokio::test]
async fn test_update_my_profile_validation() {
    let app = create_test_app().await;
    app.seed_user("Asha", "asha@ku.edu.np", "Secret1!").await;

    let response = app
        .server
        .put("/api/profile/me")
        .add_header(AUTHORIZATION, bearer(&token_for("asha@ku.edu.np")))
        .json(&json!({"website": "not a url"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body["error"]["details"]["website"].is_array());
}

#[tokio::test]
async fn test_update_my_profile_rejects_comma_in_interest() {
    let app = create_test_app().await;
    app.seed_user("Asha", "asha@ku.edu.np", "Secret1!").await;
    let token = token_for("asha@ku.edu.np");

    let response = app
        .server
        .put("/api/profile/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"research_interests": ["NLP", "Vision, Robotics"]}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body["error"]["details"]["research_interests"].is_array());

    // Nothing was stored, so the list still reads back empty
    let response = app
        .server
        .get("/api/profile/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["research_interests"], json!([]));
}

#[tokio::test]
async fn test_public_profile_unknown_user() {
    let app = create_test_app().await;

    let response = app.server.get("/api/users/no-such-id/profile").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
