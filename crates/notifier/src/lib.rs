//! Upload result notifications.
//!
//! The desktop toast and clipboard integrations live outside this workspace;
//! they implement [`Notifier`]. [`LogNotifier`] and [`NotificationQueue`] are
//! the in-process implementations.

mod notification;
mod queue;

pub use notification::{APP_TITLE, Notification, NotificationKind};
pub use queue::{NotificationQueue, QueuedNotification};

use std::sync::Mutex;

/// Receives the result of each upload.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(
                title = %notification.title,
                url = notification.clipboard.as_deref().unwrap_or(""),
                "{}",
                notification.message
            ),
            NotificationKind::Error => tracing::warn!(
                title = %notification.title,
                "{}",
                notification.message
            ),
        }
    }
}

impl Notifier for Mutex<NotificationQueue> {
    fn notify(&self, notification: Notification) {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}
