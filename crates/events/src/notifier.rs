//! Best-effort user notifications.
//!
//! [`Notifier::notify`] stores an in-app notification row and, when an
//! [`EmailDelivery`] is configured, sends an email in a background task.
//! Failures are logged and reported in [`NotifyOutcome`]; they are never
//! returned as errors, so a notification problem cannot fail the request
//! that triggered it.

use std::sync::Arc;

use portal_core::types::DbId;
use portal_db::models::notification::CreateNotification;
use portal_db::repositories::NotificationRepo;
use portal_db::DbPool;

use crate::delivery::email::EmailDelivery;

/// Who receives a notification.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub user_id: DbId,
    pub email: String,
}

/// What the notification says.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
    /// Portal path the notification points at, e.g. `/change-requests/12`.
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub stored: bool,
    /// An email send was scheduled (delivery itself is asynchronous).
    pub email_queued: bool,
}

#[derive(Clone)]
pub struct Notifier {
    pool: DbPool,
    email: Option<Arc<EmailDelivery>>,
}

impl Notifier {
    pub fn new(pool: DbPool, email: Option<EmailDelivery>) -> Self {
        Self {
            pool,
            email: email.map(Arc::new),
        }
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    /// Notify one recipient. Never fails.
    pub async fn notify(&self, recipient: &Recipient, message: &NotificationMessage) -> NotifyOutcome {
        let input = CreateNotification {
            user_id: recipient.user_id,
            title: message.title.clone(),
            message: message.body.clone(),
            link: message.link.clone(),
        };

        let stored = match NotificationRepo::create(&self.pool, &input).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    user_id = recipient.user_id,
                    error = %e,
                    "Failed to store notification",
                );
                false
            }
        };

        let email_queued = match &self.email {
            Some(delivery) => {
                let delivery = Arc::clone(delivery);
                let to = recipient.email.clone();
                let subject = message.title.clone();
                let body = match &message.link {
                    Some(link) => format!("{}\n\nView in the portal: {link}", message.body),
                    None => message.body.clone(),
                };
                tokio::spawn(async move {
                    if let Err(e) = delivery.send(&to, &subject, &body).await {
                        tracing::warn!(to = %to, error = %e, "Failed to send notification email");
                    }
                });
                true
            }
            None => false,
        };

        NotifyOutcome {
            stored,
            email_queued,
        }
    }

    /// Notify several recipients sequentially.
    pub async fn notify_all(&self, recipients: &[Recipient], message: &NotificationMessage) {
        for recipient in recipients {
            self.notify(recipient, message).await;
        }
    }
}
