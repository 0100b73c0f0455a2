use crate::notification::{Notification, NotificationKind};

/// Display duration for success notifications in milliseconds.
const DEFAULT_DURATION_MS: u64 = 4000;

/// Display duration for error notifications in milliseconds (longer for visibility).
const ERROR_DURATION_MS: u64 = 6000;

/// A queued notification.
#[derive(Debug, Clone)]
pub struct QueuedNotification {
    pub id: u64,
    pub notification: Notification,
    pub duration_ms: u64,
}

/// In-memory notification queue with monotonic ID assignment.
///
/// Timer-based dismissal is the renderer's job; this only holds the queue.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    items: Vec<QueuedNotification>,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a notification and returns its ID.
    pub fn push(&mut self, notification: Notification) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let duration_ms = match notification.kind {
            NotificationKind::Success => DEFAULT_DURATION_MS,
            NotificationKind::Error => ERROR_DURATION_MS,
        };
        self.items.push(QueuedNotification {
            id,
            notification,
            duration_ms,
        });
        id
    }

    /// Removes a notification by ID. Returns `true` if found.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let len_before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != len_before
    }

    pub fn get(&self, id: u64) -> Option<&QueuedNotification> {
        self.items.iter().find(|n| n.id == id)
    }

    /// Most recently queued notification.
    pub fn latest(&self) -> Option<&Notification> {
        self.items.last().map(|n| &n.notification)
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedNotification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
