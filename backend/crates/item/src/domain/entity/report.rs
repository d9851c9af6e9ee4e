//! Abuse Report

use chrono::{DateTime, Utc};
use kernel::id::{ItemId, ReportId, UserId};
use serde::Serialize;
use std::str::FromStr;

use crate::error::ItemError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Fraud,
    Spam,
    BuyingSelling,
    Inappropriate,
    Other,
}

impl ReportReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportReason::Fraud => "fraud",
            ReportReason::Spam => "spam",
            ReportReason::BuyingSelling => "buying_selling",
            ReportReason::Inappropriate => "inappropriate",
            ReportReason::Other => "other",
        }
    }

    /// Human readable label used in notification text
    pub const fn label(&self) -> &'static str {
        match self {
            ReportReason::Fraud => "fraud or scam",
            ReportReason::Spam => "spam",
            ReportReason::BuyingSelling => "buying or selling",
            ReportReason::Inappropriate => "inappropriate content",
            ReportReason::Other => "other reasons",
        }
    }
}

impl FromStr for ReportReason {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fraud" => Ok(ReportReason::Fraud),
            "spam" => Ok(ReportReason::Spam),
            "buying_selling" => Ok(ReportReason::BuyingSelling),
            "inappropriate" => Ok(ReportReason::Inappropriate),
            "other" => Ok(ReportReason::Other),
            _ => Err(ItemError::InvalidInput("Invalid report reason".into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    /// Owner was warned
    Reviewed,
    Resolved,
}

impl ReportStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for ReportStatus {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "reviewed" => Ok(ReportStatus::Reviewed),
            "resolved" => Ok(ReportStatus::Resolved),
            _ => Err(ItemError::InvalidInput(format!("Unknown report status: {s}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemReport {
    pub id: ReportId,
    pub item_id: ItemId,
    pub item_title: String,
    pub item_owner_id: UserId,
    pub reporter_id: UserId,
    pub reason: ReportReason,
    pub description: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
