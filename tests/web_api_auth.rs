//! Web API Authentication Tests
//!
//! Integration tests for login and session handling.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use common::{bearer, create_test_app, create_test_app_with_config, create_test_config};
use kurch::web::middleware::JwtState;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_login_success() {
    let app = create_test_app().await;
    let user = app.seed_user("Asha", "asha@ku.edu.np", "Secret1!").await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "asha@ku.edu.np", "password": "Secret1!"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 900);
    assert_eq!(body["data"]["user"]["id"], user.id.as_str());
    assert_eq!(body["data"]["user"]["email"], "asha@ku.edu.np");
    assert_eq!(body["data"]["user"]["role"], "student");

    let token = body["data"]["access_token"].as_str().unwrap();
    let claims = JwtState::new(common::JWT_SECRET).verify(token).unwrap();
    assert_eq!(claims.sub, "asha@ku.edu.np");
    assert_eq!(claims.name, "Asha");
}

#[tokio::test]
async fn test_login_token_opens_protected_routes() {
    let app = create_test_app().await;
    app.seed_user("Asha", "asha@ku.edu.np", "Secret1!").await;

    let login: Value = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "asha@ku.edu.np", "password": "Secret1!"}))
        .await
        .json();
    let token = login["data"]["access_token"].as_str().unwrap();

    let response = app
        .server
        .get("/api/profile/me")
        .add_header(AUTHORIZATION, bearer(token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "asha@ku.edu.np");
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = create_test_app().await;
    app.seed_user("Asha", "asha@ku.edu.np", "Secret1!").await;
    app.seed_external_user("Bikash", "bikash@ku.edu.np").await;

    for (email, password) in [
        ("asha@ku.edu.np", "Wrong1!!"),
        ("ghost@ku.edu.np", "Secret1!"),
        ("bikash@ku.edu.np", "Secret1!"),
    ] {
        let response = app
            .server
            .post("/api/auth/login")
            .json(&json!({"email": email, "password": password}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Invalid email or password");
    }
}

#[tokio::test]
async fn test_login_requires_university_email() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "asha@gmail.com", "password": "Secret1!"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body["error"]["details"]["email"].is_array());
}

#[tokio::test]
async fn test_login_empty_password() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "asha@ku.edu.np", "password": ""}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_login_missing_field() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "asha@ku.edu.np"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_login_rate_limited() {
    let mut config = create_test_config();
    config.auth_rate_limit = 3;
    let app = create_test_app_with_config(config).await;

    // Proxy headers are untrusted by default, so rotating them buys nothing
    for i in 0..3 {
        app.server
            .post("/api/auth/login")
            .add_header("X-Forwarded-For", format!("198.51.100.{i}"))
            .json(&json!({"email": "ghost@ku.edu.np", "password": "Secret1!"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    let response = app
        .server
        .post("/api/auth/login")
        .add_header("X-Forwarded-For", "198.51.100.99")
        .json(&json!({"email": "ghost@ku.edu.np", "password": "Secret1!"}))
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "TOO_MANY_REQUESTS");

    // Public browsing is counted separately
    app.server.get("/api/projects").await.assert_status_ok();
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = create_test_app().await;
    app.seed_user("Asha", "asha@ku.edu.np", "Secret1!").await;

    let now = chrono::Utc::now().timestamp() as u64;
    let claims = kurch::web::middleware::JwtClaims {
        sub: "asha@ku.edu.np".to_string(),
        name: "Asha".to_string(),
        role: "student".to_string(),
        iat: now - 7200,
        exp: now - 3600,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(common::JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let response = app
        .server
        .get("/api/profile/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_responses_not_cached() {
    let app = create_test_app().await;

    let response = app.server.get("/api/projects").await;
    response.assert_status_ok();
    assert_eq!(response.header("cache-control"), "no-store");
}
