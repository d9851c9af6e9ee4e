//! API DTOs

use chrono::{DateTime, Utc};
use kernel::id::{ItemId, NotificationId, ReportId};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Notification, NotificationKind};

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub reference_url: Option<String>,
    pub related_item_id: Option<ItemId>,
    pub related_report_id: Option<ReportId>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            reference_url: n.reference_url,
            related_item_id: n.related_item_id,
            related_report_id: n.related_report_id,
            created_at: n.created_at,
        }
    }
}

/// Response for GET /api/notifications
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkedResponse {
    pub updated: u64,
}
