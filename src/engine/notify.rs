//! Outbound notifications.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::EngineResult;

/// A message addressed to one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// The recipient.
    pub user_id: Uuid,
    /// Short subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// When the notification was produced.
    pub created_at: DateTime<Utc>,
}

/// Delivers notifications to employees.
pub trait Notifier: Send + Sync {
    /// Sends one notification.
    fn notify(&self, notification: &Notification) -> EngineResult<()>;
}

/// Logs every notification and keeps it in an in-memory outbox.
#[derive(Debug, Default)]
pub struct LogNotifier {
    outbox: Mutex<Vec<Notification>>,
}

impl LogNotifier {
    /// Returns everything sent so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.outbox.lock().clone()
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> EngineResult<()> {
        info!(
            user_id = %notification.user_id,
            subject = %notification.subject,
            "Notification sent"
        );
        self.outbox.lock().push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_notifier_keeps_outbox_in_order() {
        let notifier = LogNotifier::default();
        for subject in ["first", "second"] {
            notifier
                .notify(&Notification {
                    user_id: Uuid::nil(),
                    subject: subject.to_string(),
                    message: String::new(),
                    created_at: Utc::now(),
                })
                .unwrap();
        }

        let subjects: Vec<_> = notifier.sent().into_iter().map(|n| n.subject).collect();
        assert_eq!(subjects, ["first", "second"]);
    }
}
