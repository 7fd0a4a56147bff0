//! Integration tests for the auth endpoints against PostgreSQL

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success() {
    let app = common::TestApp::new().await;

    let email = format!("register_{}@example.com", uuid::Uuid::new_v4().simple());
    let (status, body) = app
        .post(
            "/api/register",
            &json!({"name": "Ada", "email": email, "password": "SecurePassword123!"}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(app.token_count(&email).await, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email() {
    let app = common::TestApp::new().await;
    let (email, _) = app.register_user("SecurePassword123!").await;

    let (status, body) = app
        .post(
            "/api/register",
            &json!({"name": "Ada", "email": email, "password": "SecurePassword123!"}),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_duplicate_registrations_create_one_user() {
    let app = common::TestApp::new().await;
    let email = format!("race_{}@example.com", uuid::Uuid::new_v4().simple());
    let body = json!({"name": "Ada", "email": email, "password": "SecurePassword123!"});

    let (a, b) = tokio::join!(
        app.post("/api/register", &body),
        app.post("/api/register", &body)
    );

    let created = [a.0, b.0]
        .iter()
        .filter(|s| **s == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_replaces_all_tokens() {
    let app = common::TestApp::new().await;
    let (email, registration_token) = app.register_user("SecurePassword123!").await;

    let (status, body) = app
        .post(
            "/api/login",
            &json!({"email": email, "password": "SecurePassword123!"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    assert_eq!(app.token_count(&email).await, 1);

    let (status, _) = app.with_token("GET", "/api/me", &registration_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.with_token("GET", "/api/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email.as_str());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_wrong_password() {
    let app = common::TestApp::new().await;
    let (email, _) = app.register_user("CorrectPassword123!").await;

    let (status, body) = app
        .post(
            "/api/login",
            &json!({"email": email, "password": "WrongPassword123!"}),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_nonexistent_user() {
    let app = common::TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/login",
            &json!({"email": "nonexistent@example.com", "password": "SomePassword123!"}),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_deletes_current_token_row() {
    let app = common::TestApp::new().await;
    let (email, token) = app.register_user("SecurePassword123!").await;

    let (status, body) = app.with_token("POST", "/api/logout", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out");
    assert_eq!(app.token_count(&email).await, 0);

    let (status, _) = app.with_token("GET", "/api/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_token_use_is_recorded() {
    let app = common::TestApp::new().await;
    let (_, token) = app.register_user("SecurePassword123!").await;
    let (id, _) = token.split_once('|').unwrap();
    let id = uuid::Uuid::parse_str(id).unwrap();

    app.with_token("GET", "/api/me", &token).await;

    let last_used: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT last_used_at FROM personal_access_tokens WHERE id = $1")
            .bind(id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert!(last_used.is_some());
}
