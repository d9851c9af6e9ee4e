//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::{ItemId, NotificationId, ReportId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{NewNotification, Notification, NotificationKind};
use crate::domain::repository::NotificationRepository;
use crate::domain::sink::NotificationSink;
use crate::error::NotificationResult;

#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl NotificationSink for PgNotificationRepository {
    async fn notify(&self, n: NewNotification) -> NotificationResult<()> {
        let id = NotificationId::new();
        sqlx::query(
            r#"
            INSERT INTO notifications (
                notification_id,
                user_id,
                kind,
                title,
                message,
                reference_url,
                related_item_id,
                related_report_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id.as_uuid())
        .bind(n.user_id.as_uuid())
        .bind(n.kind.as_str())
        .bind(&n.title)
        .bind(&n.message)
        .bind(&n.reference_url)
        .bind(n.related_item_id.map(ItemId::into_uuid))
        .bind(n.related_report_id.map(ReportId::into_uuid))
        .execute(&self.pool)
        .await?;

        tracing::debug!(notification_id = %id, user_id = %n.user_id, kind = n.kind.as_str(), "Notification stored");
        Ok(())
    }
}

impl NotificationRepository for PgNotificationRepository {
    async fn list(&self, user_id: UserId, limit: i64) -> NotificationResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT
                notification_id,
                user_id,
                kind,
                title,
                message,
                is_read,
                reference_url,
                related_item_id,
                related_report_id,
                created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(NotificationRow::into_entity).collect())
    }

    async fn unread_count(&self, user_id: UserId) -> NotificationResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn mark_read(&self, user_id: UserId, id: NotificationId) -> NotificationResult<bool> {
        let updated = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE notification_id = $1 AND user_id = $2",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn mark_all_read(&self, user_id: UserId) -> NotificationResult<u64> {
        let updated = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated)
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    notification_id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    message: String,
    is_read: bool,
    reference_url: Option<String>,
    related_item_id: Option<Uuid>,
    related_report_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_entity(self) -> Option<Notification> {
        let kind = match self.kind.parse::<NotificationKind>() {
            Ok(kind) => kind,
            Err(e) => {
                tracing::error!(error = %e, "Skipping notification with unknown kind");
                return None;
            }
        };

        Some(Notification {
            id: NotificationId::from_uuid(self.notification_id),
            user_id: UserId::from_uuid(self.user_id),
            kind,
            title: self.title,
            message: self.message,
            is_read: self.is_read,
            reference_url: self.reference_url,
            related_item_id: self.related_item_id.map(ItemId::from_uuid),
            related_report_id: self.related_report_id.map(ReportId::from_uuid),
            created_at: self.created_at,
        })
    }
}
