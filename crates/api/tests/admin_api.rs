//! HTTP-level tests for user and organization administration.

mod common;

use axum::http::StatusCode;
use common::{
    create_org, delete_auth, expect_json, get_auth, login_with, patch_json_auth, post_json_auth,
    user_with_token,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_user_in_organization(pool: PgPool) {
    let org = create_org(&pool, "Client Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/users",
        serde_json::json!({
            "name": "New Client",
            "email": "new@client.test",
            "password": "a-good-password",
            "organization_id": org.id,
        }),
        &admin,
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;

    assert_eq!(json["role"], "client");
    assert_eq!(json["organization_id"], org.id);
    assert!(json.get("password_hash").is_none());

    // The new account can sign in.
    let json = login_with(common::build_test_app(pool), "new@client.test", "a-good-password").await;
    assert_eq!(json["user"]["organization_id"], org.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_super_admin_grants_super_admin(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let (_, root) = user_with_token(&pool, "root@agency.test", "super_admin", None).await;
    let body = serde_json::json!({
        "name": "Another Root",
        "email": "root2@agency.test",
        "password": "a-good-password",
        "role": "super_admin",
    });

    let response =
        post_json_auth(common::build_test_app(pool.clone()), "/api/v1/admin/users", body.clone(), &admin).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(common::build_test_app(pool), "/api/v1/admin/users", body, &root).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user_rejects_unknown_role(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/admin/users",
        serde_json::json!({
            "name": "Odd",
            "email": "odd@agency.test",
            "password": "a-good-password",
            "role": "owner",
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_admin_requires_admin_role(pool: PgPool) {
    let (_, staff) = user_with_token(&pool, "staff@agency.test", "staff", None).await;
    let response = get_auth(common::build_test_app(pool.clone()), "/api/v1/admin/users", &staff).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(common::build_test_app(pool), "/api/v1/admin/organizations", &staff).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_role_change_and_deactivation(pool: PgPool) {
    let (admin_user, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let (target, target_token) = user_with_token(&pool, "target@agency.test", "client", None).await;

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}", target.id),
        serde_json::json!({ "role": "staff" }),
        &admin,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["role"], "staff");

    let json = expect_json(
        get_auth(common::build_test_app(pool.clone()), "/api/v1/auth/me", &target_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["role"], "staff");

    // Admins cannot deactivate themselves.
    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}", admin_user.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}", target.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(common::build_test_app(pool), "/api/v1/auth/me", &target_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_organization_crud(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let created = expect_json(
        post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/admin/organizations",
            serde_json::json!({ "name": "Bright Bakery Ltd." }),
            &admin,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["slug"], "bright-bakery-ltd");

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/organizations",
        serde_json::json!({ "name": "Bright Bakery", "slug": "bright-bakery-ltd" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/organizations",
        serde_json::json!({ "name": "Bad Slug", "slug": "Bad Slug" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = expect_json(
        patch_json_auth(
            common::build_test_app(pool),
            &format!("/api/v1/admin/organizations/{}", created["id"]),
            serde_json::json!({ "name": "Bright Bakery" }),
            &admin,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["name"], "Bright Bakery");
    assert_eq!(json["slug"], "bright-bakery-ltd");
}
