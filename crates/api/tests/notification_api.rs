//! HTTP-level tests for the caller's own notifications.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get, get_auth, post_auth, user_with_token};
use portal_db::models::notification::CreateNotification;
use portal_db::repositories::NotificationRepo;
use sqlx::PgPool;

async fn seed(pool: &PgPool, user_id: i64, title: &str) -> i64 {
    NotificationRepo::create(
        pool,
        &CreateNotification {
            user_id,
            title: title.to_string(),
            message: "Something happened".to_string(),
            link: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_requires_auth(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/notifications").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_and_mark_read(pool: PgPool) {
    let (me, token) = user_with_token(&pool, "me@agency.test", "staff", None).await;
    let (other, _) = user_with_token(&pool, "other@agency.test", "staff", None).await;
    let first = seed(&pool, me.id, "First").await;
    seed(&pool, me.id, "Second").await;
    let foreign = seed(&pool, other.id, "Not mine").await;

    let json = expect_json(
        get_auth(common::build_test_app(pool.clone()), "/api/v1/notifications", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/notifications/{first}/read"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Someone else's notification looks missing.
    let response = post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/notifications/{foreign}/read"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = expect_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/notifications?unread_only=true",
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "Second");

    let json = expect_json(
        post_auth(common::build_test_app(pool.clone()), "/api/v1/notifications/read-all", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["marked"], 1);

    let json = expect_json(
        get_auth(
            common::build_test_app(pool),
            "/api/v1/notifications?unread_only=true",
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
