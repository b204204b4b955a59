use async_trait::async_trait;
use crash_signal_core::{CollaboratorError, Notification, NotificationSink};

/// Writes notifications to the log. Priority 2 alerts log at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, notification: &Notification) -> Result<(), CollaboratorError> {
        if notification.priority >= 2 {
            tracing::warn!(
                kind = ?notification.kind,
                title = %notification.title,
                "{}",
                notification.message
            );
        } else {
            tracing::info!(
                kind = ?notification.kind,
                title = %notification.title,
                "{}",
                notification.message
            );
        }
        Ok(())
    }
}
