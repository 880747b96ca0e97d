//! User-facing notifications.

use std::cell::RefCell;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationLevel {
    /// How long a toast of this level stays up.
    pub fn display_duration(self) -> Duration {
        match self {
            NotificationLevel::Success | NotificationLevel::Info => Duration::from_secs(3),
            NotificationLevel::Warning => Duration::from_secs(4),
            NotificationLevel::Error => Duration::from_secs(5),
        }
    }
}

/// Fire-and-forget sink for messages shown to the user.
pub trait Notifier {
    fn notify(&self, level: NotificationLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NotificationLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NotificationLevel::Warning, message);
    }

    fn info(&self, message: &str) {
        self.notify(NotificationLevel::Info, message);
    }
}

/// Routes notifications to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Success | NotificationLevel::Info => log::info!("{message}"),
            NotificationLevel::Warning => log::warn!("{message}"),
            NotificationLevel::Error => log::error!("{message}"),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<(NotificationLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(NotificationLevel, String)> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<(NotificationLevel, String)> {
        self.messages.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.success("saved");
        notifier.error("boom");
        assert_eq!(notifier.messages().len(), 2);
        assert_eq!(
            notifier.last(),
            Some((NotificationLevel::Error, "boom".to_string()))
        );
        notifier.clear();
        assert!(notifier.last().is_none());
    }

    #[test]
    fn test_durations() {
        assert!(
            NotificationLevel::Error.display_duration()
                > NotificationLevel::Success.display_duration()
        );
    }
}
