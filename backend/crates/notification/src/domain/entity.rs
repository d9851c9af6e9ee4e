//! Notification Entities

use chrono::{DateTime, Utc};
use kernel::id::{ItemId, NotificationId, ReportId, UserId};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A post was reported (sent to admins)
    Report,
    /// Moderation warning to a post owner
    Warning,
    SystemUpdate,
    /// Bounty payout or escrow refund
    Bounty,
    TopUp,
}

impl NotificationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Report => "report",
            NotificationKind::Warning => "warning",
            NotificationKind::SystemUpdate => "system_update",
            NotificationKind::Bounty => "bounty",
            NotificationKind::TopUp => "topup",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "report" => Ok(NotificationKind::Report),
            "warning" => Ok(NotificationKind::Warning),
            "system_update" => Ok(NotificationKind::SystemUpdate),
            "bounty" => Ok(NotificationKind::Bounty),
            "topup" => Ok(NotificationKind::TopUp),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub reference_url: Option<String>,
    pub related_item_id: Option<ItemId>,
    pub related_report_id: Option<ReportId>,
    pub created_at: DateTime<Utc>,
}

/// Notification about to be delivered
///
/// ```
/// use kernel::id::{ItemId, UserId};
/// use notification::{NewNotification, NotificationKind};
///
/// let item_id = ItemId::new();
/// let n = NewNotification::new(UserId::new(), NotificationKind::Bounty, "Bounty received", "+100 coins")
///     .with_item(item_id);
/// assert_eq!(n.related_item_id, Some(item_id));
/// ```
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference_url: Option<String>,
    pub related_item_id: Option<ItemId>,
    pub related_report_id: Option<ReportId>,
}

impl NewNotification {
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            reference_url: None,
            related_item_id: None,
            related_report_id: None,
        }
    }

    pub fn with_reference_url(mut self, url: impl Into<String>) -> Self {
        self.reference_url = Some(url.into());
        self
    }

    /// Also sets `reference_url` to the item page unless one is already set
    pub fn with_item(mut self, item_id: ItemId) -> Self {
        self.related_item_id = Some(item_id);
        if self.reference_url.is_none() {
            self.reference_url = Some(format!("/items/{item_id}"));
        }
        self
    }

    pub fn with_report(mut self, report_id: ReportId) -> Self {
        self.related_report_id = Some(report_id);
        self
    }
}
