//! Notification delivery
//!
//! Producers (items, wallet) depend only on [`NotificationSink`].

use crate::domain::entity::NewNotification;
use crate::error::NotificationResult;

#[trait_variant::make(NotificationSink: Send)]
pub trait LocalNotificationSink {
    async fn notify(&self, notification: NewNotification) -> NotificationResult<()>;
}

/// Deliver a batch, logging failures instead of returning them.
///
/// Callers invoke this after their own transaction has committed; a lost
/// notification never undoes a settlement.
pub async fn deliver<S>(sink: &S, notifications: Vec<NewNotification>)
where
    S: NotificationSink + Sync,
{
    for notification in notifications {
        let user_id = notification.user_id;
        let kind = notification.kind;
        if let Err(e) = sink.notify(notification).await {
            tracing::warn!(
                error = %e,
                user_id = %user_id,
                kind = kind.as_str(),
                "Notification delivery failed"
            );
        }
    }
}
