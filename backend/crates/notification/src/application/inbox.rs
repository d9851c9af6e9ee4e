//! Inbox Use Cases

use std::sync::Arc;

use kernel::id::{NotificationId, UserId};

use crate::application::config::NotificationConfig;
use crate::domain::entity::Notification;
use crate::domain::repository::NotificationRepository;
use crate::error::{NotificationError, NotificationResult};

/// Summary returned with every listing
#[derive(Debug, Clone)]
pub struct InboxOutput {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

pub struct InboxUseCase<R>
where
    R: NotificationRepository,
{
    repo: Arc<R>,
    config: Arc<NotificationConfig>,
}

impl<R> InboxUseCase<R>
where
    R: NotificationRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<NotificationConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn list(&self, user_id: UserId, limit: Option<i64>) -> NotificationResult<InboxOutput> {
        let limit = self.config.clamp_limit(limit);
        let notifications = self.repo.list(user_id, limit).await?;
        let unread_count = self.repo.unread_count(user_id).await?;
        Ok(InboxOutput {
            notifications,
            unread_count,
        })
    }

    pub async fn unread_count(&self, user_id: UserId) -> NotificationResult<i64> {
        self.repo.unread_count(user_id).await
    }

    pub async fn mark_read(&self, user_id: UserId, id: NotificationId) -> NotificationResult<()> {
        if !self.repo.mark_read(user_id, id).await? {
            return Err(NotificationError::NotFound);
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: UserId) -> NotificationResult<u64> {
        let changed = self.repo.mark_all_read(user_id).await?;
        tracing::debug!(user_id = %user_id, changed, "Notifications marked read");
        Ok(changed)
    }
}
