//! The cleanup job honours the configured retention window.

mod common;

use chrono::{Duration, Utc};
use common::create_user;
use portal_api::background::session_cleanup::purge_once;
use portal_db::models::session::CreateSession;
use portal_db::repositories::SessionRepo;
use sqlx::PgPool;

async fn session(pool: &PgPool, user_id: i64, hash: &str, expires_in: Duration) {
    SessionRepo::create(
        pool,
        &CreateSession {
            user_id,
            refresh_token_hash: hash.into(),
            expires_at: Utc::now() + expires_in,
            user_agent: None,
            ip_address: None,
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn purge_respects_retention_window(pool: PgPool) {
    let user = create_user(&pool, "sessions@agency.test", "staff", None).await;
    session(&pool, user.id, "live", Duration::days(7)).await;
    session(&pool, user.id, "expired-two-days", -Duration::days(2)).await;
    session(&pool, user.id, "expired-two-hours", -Duration::hours(2)).await;

    assert_eq!(purge_once(&pool, Duration::hours(24)).await.unwrap(), 1);
    assert_eq!(purge_once(&pool, Duration::hours(24)).await.unwrap(), 0);
    assert_eq!(purge_once(&pool, Duration::hours(1)).await.unwrap(), 1);
    assert_eq!(
        SessionRepo::count_active_for_user(&pool, user.id).await.unwrap(),
        1
    );
}
