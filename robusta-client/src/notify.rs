//! UI notification boundary
//!
//! The dashboard shell implements this trait; the core never renders
//! anything itself. Two surfaces only: transient toasts, and the blocking
//! confirmations required by staff calls and cancel requests.

use async_trait::async_trait;

pub use shared::message::payload::{NotificationCategory, NotificationLevel, NotificationPayload};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Surface a transient notification.
    async fn notify(&self, payload: NotificationPayload);

    /// Ask the user for an explicit yes/no decision. Blocks the caller,
    /// never the dispatcher's other handlers.
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Notifier that logs via `tracing` and answers yes to every prompt.
/// Useful for demos and headless operation.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, payload: NotificationPayload) {
        match payload.level {
            NotificationLevel::Info => {
                tracing::info!(title = %payload.title, "{}", payload.message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(title = %payload.title, "{}", payload.message)
            }
            NotificationLevel::Error => {
                tracing::error!(title = %payload.title, "{}", payload.message)
            }
        }
    }

    async fn confirm(&self, title: &str, message: &str) -> bool {
        tracing::info!(title, "{} (auto-accepted)", message);
        true
    }
}
