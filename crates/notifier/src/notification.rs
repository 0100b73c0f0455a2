use monarch_protocol::TerminalOutcome;

/// Title shown on every notification.
pub const APP_TITLE: &str = "MonarchUpload";

/// The visual category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A user-facing upload result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Text to place on the clipboard. Only set for successful uploads that
    /// returned a URL.
    pub clipboard: Option<String>,
}

impl Notification {
    /// Builds the notification for a terminal outcome.
    ///
    /// The service's message is shown either way; the URL is offered for
    /// the clipboard only on success.
    pub fn from_outcome(outcome: &TerminalOutcome) -> Self {
        let kind = if outcome.succeeded {
            NotificationKind::Success
        } else {
            NotificationKind::Error
        };
        Self {
            kind,
            title: APP_TITLE.to_string(),
            message: outcome.message.clone(),
            clipboard: if outcome.succeeded {
                outcome.url.clone()
            } else {
                None
            },
        }
    }

    /// Builds an error notification for an upload that stopped early.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: APP_TITLE.to_string(),
            message: message.into(),
            clipboard: None,
        }
    }
}
