//! Top-up Transaction
//!
//! A purchase of coins. Created `pending`; moved to `success` or `failed`
//! at most once by [`TopUpTransaction::apply_report`], which both the
//! webhook and the poll path run under a row lock.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use kernel::id::{TopUpId, UserId};
use serde::Serialize;
use std::str::FromStr;

use crate::error::WalletError;

/// Midtrans reports `transaction_time` in Western Indonesia Time
const PROCESSOR_UTC_OFFSET_SECS: i32 = 7 * 60 * 60;
const PROCESSOR_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopUpStatus {
    Pending,
    Success,
    Failed,
}

impl TopUpStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TopUpStatus::Pending => "pending",
            TopUpStatus::Success => "success",
            TopUpStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TopUpStatus::Pending)
    }
}

impl FromStr for TopUpStatus {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TopUpStatus::Pending),
            "success" => Ok(TopUpStatus::Success),
            "failed" => Ok(TopUpStatus::Failed),
            _ => Err(WalletError::Internal(format!("Unknown top-up status: {s}"))),
        }
    }
}

/// Map the processor's `transaction_status` / `fraud_status` pair to a
/// local status.
pub fn map_processor_status(transaction_status: &str, fraud_status: &str) -> TopUpStatus {
    match transaction_status {
        "capture" => match fraud_status {
            "accept" | "challenge" => TopUpStatus::Success,
            _ => TopUpStatus::Failed,
        },
        "settlement" => TopUpStatus::Success,
        "pending" => TopUpStatus::Pending,
        "deny" | "cancel" | "expire" | "failure" => TopUpStatus::Failed,
        _ => TopUpStatus::Pending,
    }
}

/// Parse a processor timestamp such as `2024-05-01 13:45:10`
pub fn parse_processor_time(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), PROCESSOR_TIME_FORMAT).ok()?;
    let offset = FixedOffset::east_opt(PROCESSOR_UTC_OFFSET_SECS)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
}

/// Status of a transaction as seen by the processor, from either the
/// webhook body or the status API.
#[derive(Debug, Clone, Default)]
pub struct ProcessorReport {
    pub transaction_status: String,
    pub fraud_status: String,
    pub payment_type: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
}

impl ProcessorReport {
    pub fn mapped_status(&self) -> TopUpStatus {
        map_processor_status(&self.transaction_status, &self.fraud_status)
    }
}

/// What applying a report did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub previous: TopUpStatus,
    pub current: TopUpStatus,
    /// Coins to credit in the same transaction; non-zero at most once
    pub credit: i64,
}

#[derive(Debug, Clone)]
pub struct TopUpTransaction {
    pub id: TopUpId,
    pub order_id: String,
    pub user_id: UserId,
    /// Coins
    pub amount: i64,
    /// IDR, always from the price table
    pub price: i64,
    pub status: TopUpStatus,
    pub payment_type: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
    pub snap_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TopUpTransaction {
    pub fn pending(user_id: UserId, amount: i64, price: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: TopUpId::new(),
            order_id: order_id_for(user_id, now),
            user_id,
            amount,
            price,
            status: TopUpStatus::Pending,
            payment_type: None,
            transaction_time: None,
            snap_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Guarded apply: terminal transactions never change again, and coins
    /// are credited only on the transition into `success`.
    pub fn apply_report(&mut self, report: &ProcessorReport, now: DateTime<Utc>) -> Reconciliation {
        let previous = self.status;
        if previous.is_terminal() {
            return Reconciliation {
                previous,
                current: previous,
                credit: 0,
            };
        }

        let mapped = report.mapped_status();
        self.status = mapped;
        if let Some(payment_type) = report.payment_type.as_ref().filter(|p| !p.is_empty()) {
            self.payment_type = Some(payment_type.clone());
        }
        if report.transaction_time.is_some() {
            self.transaction_time = report.transaction_time;
        }
        self.updated_at = now;

        let credit = if mapped == TopUpStatus::Success && previous != TopUpStatus::Success {
            self.amount
        } else {
            0
        };

        Reconciliation {
            previous,
            current: mapped,
            credit,
        }
    }
}

/// `TOPUP-{user}-{unix seconds}`
pub fn order_id_for(user_id: UserId, now: DateTime<Utc>) -> String {
    format!("TOPUP-{}-{}", user_id.simple(), now.timestamp())
}
