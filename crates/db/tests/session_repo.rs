//! Repository tests for refresh-token sessions.

use chrono::{Duration, Utc};
use portal_core::types::DbId;
use portal_db::models::session::CreateSession;
use portal_db::models::user::CreateUser;
use portal_db::repositories::{SessionRepo, UserRepo};
use sqlx::PgPool;

async fn user(pool: &PgPool) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "sessions@client.test".into(),
            name: "Session Holder".into(),
            password_hash: "not-a-real-hash".into(),
            role: "client".into(),
            organization_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn session(pool: &PgPool, user_id: DbId, hash: &str, expires_in: Duration) {
    SessionRepo::create(
        pool,
        &CreateSession {
            user_id,
            refresh_token_hash: hash.into(),
            expires_at: Utc::now() + expires_in,
            user_agent: Some("portal-web/1.0".into()),
            ip_address: None,
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_can_be_consumed_once(pool: PgPool) {
    let user_id = user(&pool).await;
    session(&pool, user_id, "hash-a", Duration::days(7)).await;

    let consumed = SessionRepo::consume(&pool, "hash-a").await.unwrap().unwrap();
    assert_eq!(consumed.user_id, user_id);
    assert!(consumed.is_revoked);
    assert_eq!(consumed.user_agent.as_deref(), Some("portal-web/1.0"));

    assert!(SessionRepo::consume(&pool, "hash-a").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_session_cannot_be_consumed(pool: PgPool) {
    let user_id = user(&pool).await;
    session(&pool, user_id, "hash-old", -Duration::minutes(1)).await;

    assert!(SessionRepo::consume(&pool, "hash-old").await.unwrap().is_none());
    assert!(SessionRepo::consume(&pool, "never-issued").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revoke_all_ends_every_live_session(pool: PgPool) {
    let user_id = user(&pool).await;
    session(&pool, user_id, "hash-1", Duration::days(7)).await;
    session(&pool, user_id, "hash-2", Duration::days(7)).await;
    assert_eq!(SessionRepo::count_active_for_user(&pool, user_id).await.unwrap(), 2);

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user_id).await.unwrap(), 2);
    assert_eq!(SessionRepo::count_active_for_user(&pool, user_id).await.unwrap(), 0);
    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn purge_keeps_recent_and_live_sessions(pool: PgPool) {
    let user_id = user(&pool).await;
    session(&pool, user_id, "live", Duration::days(7)).await;
    session(&pool, user_id, "long-expired", -Duration::days(3)).await;
    session(&pool, user_id, "just-revoked", Duration::days(7)).await;
    SessionRepo::consume(&pool, "just-revoked").await.unwrap();

    let deleted = SessionRepo::purge_stale(&pool, Utc::now() - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let deleted_now = SessionRepo::purge_stale(&pool, Utc::now() + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(deleted_now, 1);
    assert_eq!(SessionRepo::count_active_for_user(&pool, user_id).await.unwrap(), 1);
}
