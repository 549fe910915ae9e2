//! Best-effort notifications addressed by user id.

use portal_core::types::DbId;
use portal_db::repositories::UserRepo;
use portal_events::{NotificationMessage, Recipient};

use crate::state::AppState;

/// Notify `user_id`, looking up their email first. Never fails.
pub async fn notify_user(state: &AppState, user_id: DbId, message: NotificationMessage) {
    let user = match UserRepo::find_by_id(&state.pool, user_id).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => {
            tracing::debug!(user_id, "Skipping notification for missing or inactive user");
            return;
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to load notification recipient");
            return;
        }
    };

    let recipient = Recipient {
        user_id: user.id,
        email: user.email,
    };
    state.notifier.notify(&recipient, &message).await;
}
