//! Outbound notifications for the client portal.
//!
//! - [`delivery::email`] -- SMTP email delivery, enabled by `SMTP_HOST`.
//! - [`Notifier`] -- stores an in-app notification and, when email is
//!   configured, mails the recipient. Never fails the caller.

pub mod delivery;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use notifier::{NotificationMessage, Notifier, NotifyOutcome, Recipient};
