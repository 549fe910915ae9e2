//! HTTP-level tests for invoices: totals, numbering, status transitions and
//! organization scoping.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_org, create_project, delete_auth, expect_json, get_auth, patch_json_auth,
    post_json_auth, user_with_token,
};
use portal_core::types::DbId;
use portal_db::repositories::NotificationRepo;
use sqlx::PgPool;

fn invoice_body(organization_id: DbId) -> serde_json::Value {
    serde_json::json!({
        "organization_id": organization_id,
        "tax_rate_bps": 825,
        "line_items": [
            { "description": "Design", "quantity": 10.0, "unit_price_cents": 15000 },
            { "description": "Hosting", "quantity": 1.0, "unit_price_cents": 4999 },
        ],
    })
}

async fn create_invoice(pool: &PgPool, token: &str, organization_id: DbId) -> serde_json::Value {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/invoices",
        invoice_body(organization_id),
        token,
    )
    .await;
    expect_json(response, StatusCode::CREATED).await
}

async fn set_status(pool: &PgPool, token: &str, id: &serde_json::Value, status: &str) -> axum::response::Response {
    patch_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/invoices/{id}/status"),
        serde_json::json!({ "status": status }),
        token,
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_computes_totals_and_number(pool: PgPool) {
    let org = create_org(&pool, "Billing Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let first = create_invoice(&pool, &admin, org.id).await;
    assert_eq!(first["status"], "draft");
    assert_eq!(first["subtotal_cents"], 154_999);
    assert_eq!(first["tax_cents"], 12_787);
    assert_eq!(first["total_cents"], 167_786);
    assert_eq!(first["line_items"].as_array().unwrap().len(), 2);
    assert_eq!(first["line_items"][0]["amount_cents"], 150_000);

    let second = create_invoice(&pool, &admin, org.id).await;
    let first_number = first["number"].as_str().unwrap();
    let second_number = second["number"].as_str().unwrap();
    assert!(first_number.starts_with("INV-"));
    assert!(first_number.ends_with("-0001"));
    assert!(second_number.ends_with("-0002"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_bad_lines(pool: PgPool) {
    let org = create_org(&pool, "Billing Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let cases = [
        serde_json::json!({
            "organization_id": org.id,
            "line_items": [{ "description": "Zero", "quantity": 0.0, "unit_price_cents": 100 }],
        }),
        serde_json::json!({
            "organization_id": org.id,
            "line_items": [{ "description": " ", "quantity": 1.0, "unit_price_cents": 100 }],
        }),
        serde_json::json!({ "organization_id": org.id, "tax_rate_bps": 20000 }),
    ];
    for body in cases {
        let response =
            post_json_auth(common::build_test_app(pool.clone()), "/api/v1/invoices", body, &admin).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_must_belong_to_organization(pool: PgPool) {
    let org = create_org(&pool, "Billing Org").await;
    let other = create_org(&pool, "Other Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let project_id = create_project(&pool, &admin, other.id, "Elsewhere").await;

    let mut body = invoice_body(org.id);
    body["project_id"] = serde_json::json!(project_id);
    let response = post_json_auth(common::build_test_app(pool), "/api/v1/invoices", body, &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_staff_cannot_create_invoices(pool: PgPool) {
    let org = create_org(&pool, "Billing Org").await;
    let (_, staff) = user_with_token(&pool, "staff@agency.test", "staff", None).await;
    let response =
        post_json_auth(common::build_test_app(pool), "/api/v1/invoices", invoice_body(org.id), &staff).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_transitions(pool: PgPool) {
    let org = create_org(&pool, "Billing Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let (client, _) = user_with_token(&pool, "client@billing.test", "client", Some(org.id)).await;
    let invoice = create_invoice(&pool, &admin, org.id).await;
    let id = &invoice["id"];

    // draft -> paid skips sending.
    let response = set_status(&pool, &admin, id, "paid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = expect_json(set_status(&pool, &admin, id, "sent").await, StatusCode::OK).await;
    assert_eq!(json["status"], "sent");

    let notifications = NotificationRepo::list_for_user(&pool, client.id, true, 10, 0)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);

    let json = expect_json(set_status(&pool, &admin, id, "paid").await, StatusCode::OK).await;
    assert_eq!(json["status"], "paid");
    assert!(json["paid_at"].is_string());

    // paid is terminal.
    let response = set_status(&pool, &admin, id, "void").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = set_status(&pool, &admin, id, "refunded").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_drafts_can_be_deleted(pool: PgPool) {
    let org = create_org(&pool, "Billing Org").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;

    let draft = create_invoice(&pool, &admin, org.id).await;
    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/invoices/{}", draft["id"]),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let sent = create_invoice(&pool, &admin, org.id).await;
    set_status(&pool, &admin, &sent["id"], "sent").await;
    let response = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/invoices/{}", sent["id"]),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_clients_only_see_their_organization(pool: PgPool) {
    let mine = create_org(&pool, "Mine").await;
    let theirs = create_org(&pool, "Theirs").await;
    let (_, admin) = user_with_token(&pool, "admin@agency.test", "admin", None).await;
    let (_, client) = user_with_token(&pool, "client@mine.test", "client", Some(mine.id)).await;

    let own = create_invoice(&pool, &admin, mine.id).await;
    let foreign = create_invoice(&pool, &admin, theirs.id).await;

    // The organization_id filter cannot widen a client's scope.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/invoices?organization_id={}", theirs.id),
        &client,
    )
    .await;
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![own["id"].as_i64().unwrap()]);

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/invoices/{}", foreign["id"]),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
