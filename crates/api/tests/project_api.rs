//! HTTP-level tests for projects, project requests and organization scoping.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_org, create_project, delete_auth, expect_json, get_auth, patch_json_auth,
    post_auth, post_json_auth, user_with_token,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_derives_slug(pool: PgPool) {
    let org = create_org(&pool, "Slug Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/projects",
        serde_json::json!({ "organization_id": org.id, "name": "Spring Campaign 2026" }),
        &admin,
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(json["slug"], "spring-campaign-2026");
    assert_eq!(json["status"], "planning");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_validation(pool: PgPool) {
    let org = create_org(&pool, "Slug Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let cases = [
        (serde_json::json!({ "organization_id": org.id }), StatusCode::BAD_REQUEST),
        (
            serde_json::json!({ "organization_id": org.id, "name": "X", "status": "paused" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            serde_json::json!({ "organization_id": 999_999, "name": "Orphan" }),
            StatusCode::BAD_REQUEST,
        ),
    ];
    for (body, status) in cases {
        let response =
            post_json_auth(common::build_test_app(pool.clone()), "/api/v1/projects", body, &admin).await;
        assert_eq!(response.status(), status);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_staff_and_clients_cannot_create_projects(pool: PgPool) {
    let org = create_org(&pool, "Slug Org").await;
    let (_, staff) = user_with_token(&pool, "staff@agency.test", "staff", None).await;
    let (_, client) = user_with_token(&pool, "client@slug.test", "client", Some(org.id)).await;

    for token in [staff, client] {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/projects",
            serde_json::json!({ "organization_id": org.id, "name": "Nope" }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_clients_see_only_their_projects(pool: PgPool) {
    let mine = create_org(&pool, "Mine").await;
    let theirs = create_org(&pool, "Theirs").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let (_, client) = user_with_token(&pool, "client@mine.test", "client", Some(mine.id)).await;

    let own = create_project(&pool, &admin, mine.id, "Own Project").await;
    let foreign = create_project(&pool, &admin, theirs.id, "Foreign Project").await;

    let json = expect_json(
        get_auth(common::build_test_app(pool.clone()), "/api/v1/projects", &client).await,
        StatusCode::OK,
    )
    .await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![own]);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{foreign}"),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff see everything.
    let (_, staff) = user_with_token(&pool, "staff@agency.test", "staff", None).await;
    let json = body_json(get_auth(common::build_test_app(pool), "/api/v1/projects", &staff).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_without_organization_is_forbidden(pool: PgPool) {
    let (_, client) = user_with_token(&pool, "loose@client.test", "client", None).await;
    let response = get_auth(common::build_test_app(pool), "/api/v1/projects", &client).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_soft_delete(pool: PgPool) {
    let org = create_org(&pool, "Slug Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let id = create_project(&pool, &admin, org.id, "Lifecycle").await;
    let uri = format!("/api/v1/projects/{id}");

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({ "status": "in_progress" }),
        &admin,
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["status"], "in_progress");

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({ "status": "archived" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(common::build_test_app(pool), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Project requests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_request_lifecycle(pool: PgPool) {
    let org = create_org(&pool, "Prospect").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let (client_user, client) =
        user_with_token(&pool, "client@prospect.test", "client", Some(org.id)).await;

    let created = expect_json(
        post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/project-requests",
            serde_json::json!({
                "title": "Online Store",
                "description": "We want to sell merch",
                "budget_range": "10k-20k",
            }),
            &client,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["status"], "submitted");
    assert_eq!(created["organization_id"], org.id);
    assert_eq!(created["requested_by"], client_user.id);
    let id = created["id"].as_i64().unwrap();

    // Clients cannot review.
    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/project-requests/{id}/status"),
        serde_json::json!({ "status": "approved" }),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/project-requests/{id}/status"),
        serde_json::json!({ "status": "reviewing" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = expect_json(
        post_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/project-requests/{id}/convert"),
            &admin,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["project"]["name"], "Online Store");
    assert_eq!(json["project"]["organization_id"], org.id);
    assert_eq!(json["project_request"]["status"], "approved");
    assert_eq!(json["project_request"]["converted_project_id"], json["project"]["id"]);

    let response = post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/project-requests/{id}/convert"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The requester heard about both changes.
    let json = expect_json(
        get_auth(common::build_test_app(pool), "/api/v1/notifications", &client).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_request_requires_title_and_description(pool: PgPool) {
    let org = create_org(&pool, "Prospect").await;
    let (_, client) = user_with_token(&pool, "client@prospect.test", "client", Some(org.id)).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/project-requests",
        serde_json::json!({ "title": "No description" }),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_conversions_create_one_project(pool: PgPool) {
    use portal_db::repositories::project_request_repo::NewProjectRequest;
    use portal_db::repositories::ProjectRequestRepo;

    let org = create_org(&pool, "Race Org").await;
    let (client_user, _) =
        user_with_token(&pool, "client@race.test", "client", Some(org.id)).await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let request = ProjectRequestRepo::create(
        &pool,
        &NewProjectRequest {
            organization_id: org.id,
            requested_by: client_user.id,
            title: "Booking Site",
            description: "Online bookings",
            budget_range: None,
            timeline: None,
        },
    )
    .await
    .unwrap();

    let uri = format!("/api/v1/project-requests/{}/convert", request.id);
    let (a, b) = tokio::join!(
        post_auth(common::build_test_app(pool.clone()), &uri, &admin),
        post_auth(common::build_test_app(pool.clone()), &uri, &admin),
    );
    let mut statuses = [a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);

    let (projects,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM projects WHERE organization_id = $1")
            .bind(org.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(projects, 1);
}
