//! Repository Traits

use kernel::id::{NotificationId, UserId};

use crate::domain::entity::Notification;
use crate::error::NotificationResult;

#[trait_variant::make(NotificationRepository: Send)]
pub trait LocalNotificationRepository {
    /// Newest first
    async fn list(&self, user_id: UserId, limit: i64) -> NotificationResult<Vec<Notification>>;

    async fn unread_count(&self, user_id: UserId) -> NotificationResult<i64>;

    /// Returns `false` if the notification does not exist or belongs to
    /// someone else
    async fn mark_read(&self, user_id: UserId, id: NotificationId) -> NotificationResult<bool>;

    /// Returns the number of notifications that changed
    async fn mark_all_read(&self, user_id: UserId) -> NotificationResult<u64>;
}
