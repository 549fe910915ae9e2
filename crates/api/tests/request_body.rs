//! Bodies that fail to deserialize get the same 400 JSON error as any
//! other validation failure.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{
    build_test_app, create_org, create_project, expect_json, post_json, post_json_auth,
    user_with_token,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

fn assert_validation_error(json: &serde_json::Value, field: &str) {
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains(field), "message {message:?} should name {field}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_without_token_is_400(pool: PgPool) {
    let response = post_json(build_test_app(pool), "/api/v1/auth/refresh", json!({})).await;
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_validation_error(&json, "refresh_token");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn plan_without_monthly_hours_is_400(pool: PgPool) {
    let org = create_org(&pool, "Body Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let project_id = create_project(&pool, &admin, org.id, "Body Site").await;

    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/v1/projects/{project_id}/maintenance-plans"),
        json!({}),
        &admin,
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_validation_error(&json, "monthly_hours");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invoice_without_fields_is_400(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let response =
        post_json_auth(build_test_app(pool), "/api/v1/invoices", json!({}), &admin).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_field_type_is_400(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/invoices",
        json!({ "organization_id": "acme", "line_items": [] }),
        &admin,
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_validation_error(&json, "organization_id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_is_400(pool: PgPool) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let response = build_test_app(pool).oneshot(request).await.unwrap();
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
