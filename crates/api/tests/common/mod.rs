//! Shared helpers for the HTTP-level integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use portal_api::auth::jwt::JwtConfig;
use portal_api::auth::password::hash_password;
use portal_api::config::ServerConfig;
use portal_api::router::build_app_router;
use portal_api::state::AppState;
use portal_core::types::DbId;
use portal_db::models::organization::Organization;
use portal_db::models::user::{CreateUser, User};
use portal_db::repositories::{OrganizationRepo, UserRepo};
use portal_events::Notifier;

pub const TEST_PASSWORD: &str = "test_password_123!";
pub const ADMIN_EMAIL: &str = "owner@agency.test";

/// A test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        admin_email: Some(ADMIN_EMAIL.to_string()),
        allow_registration: true,
        session_retention_hours: 24,
    }
}

/// Build the production router (same middleware stack) around `pool`.
/// Email delivery is disabled; in-app notifications are still stored.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        notifier: Notifier::new(pool.clone(), None),
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the JSON body.
pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_org(pool: &PgPool, name: &str) -> Organization {
    let slug = portal_core::slug::slugify(name);
    OrganizationRepo::create(pool, name, &slug).await.unwrap()
}

/// Insert a user directly with [`TEST_PASSWORD`].
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    role: &str,
    organization_id: Option<DbId>,
) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: email.split('@').next().unwrap_or(email).to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: role.to_string(),
            organization_id,
        },
    )
    .await
    .unwrap()
}

/// Log in through the API with [`TEST_PASSWORD`] and return the full auth
/// response.
pub async fn login(app: Router, email: &str) -> serde_json::Value {
    login_with(app, email, TEST_PASSWORD).await
}

pub async fn login_with(app: Router, email: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Create a user and return `(user, access_token)`.
pub async fn user_with_token(
    pool: &PgPool,
    email: &str,
    role: &str,
    organization_id: Option<DbId>,
) -> (User, String) {
    let user = create_user(pool, email, role, organization_id).await;
    let json = login(build_test_app(pool.clone()), email).await;
    let token = json["access_token"].as_str().unwrap().to_string();
    (user, token)
}

/// Create a project in `organization_id` through the API as `admin_token`.
pub async fn create_project(pool: &PgPool, admin_token: &str, organization_id: DbId, name: &str) -> DbId {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/projects",
        serde_json::json!({ "organization_id": organization_id, "name": name }),
        admin_token,
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    json["id"].as_i64().unwrap()
}
