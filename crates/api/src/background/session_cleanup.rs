//! Deletes refresh-token sessions that can no longer be used.
//!
//! A session becomes dead once it is revoked or expired. Dead rows stay for
//! the configured retention window so recent logouts and rotations remain
//! visible, then a pass of this job removes them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use portal_db::repositories::SessionRepo;
use portal_db::DbPool;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Time between passes.
const PASS_EVERY: Duration = Duration::from_secs(60 * 60);

/// Sessions that died before this instant are eligible for deletion.
pub fn purge_cutoff(now: DateTime<Utc>, retention: chrono::Duration) -> DateTime<Utc> {
    now - retention
}

/// Delete every session that has been dead for longer than `retention`.
/// Returns the number of rows removed.
pub async fn purge_once(pool: &DbPool, retention: chrono::Duration) -> Result<u64, sqlx::Error> {
    SessionRepo::purge_stale(pool, purge_cutoff(Utc::now(), retention)).await
}

/// Spawned from `main`. Runs one pass immediately, then one per hour, and
/// returns as soon as `shutdown` changes.
pub async fn run(pool: DbPool, retention: chrono::Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticks = tokio::time::interval(PASS_EVERY);
    // A pass that overran should not trigger a burst of catch-up passes.
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        retention_hours = retention.num_hours(),
        "Expired session purge scheduled"
    );

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticks.tick() => {
                match purge_once(&pool, retention).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "Deleted dead sessions"),
                    Err(e) => tracing::warn!(error = %e, "Dead session purge did not complete"),
                }
            }
        }
    }

    tracing::debug!("Expired session purge shut down");
}
