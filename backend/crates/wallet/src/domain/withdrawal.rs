//! Withdrawal Request
//!
//! Coins are debited when the request is made; a rejection refunds them.

use chrono::{DateTime, Utc};
use kernel::id::{UserId, WithdrawalId};
use serde::Serialize;
use std::str::FromStr;

use crate::error::{WalletError, WalletResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for WithdrawalStatus {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            _ => Err(WalletError::InvalidInput(format!("Unknown withdrawal status: {s}"))),
        }
    }
}

/// Payout destination as entered by the user
#[derive(Debug, Clone)]
pub struct PayoutDetails {
    pub method: String,
    pub account_name: String,
    pub account_number: String,
    pub note: String,
}

impl PayoutDetails {
    pub const FIELD_MAX: usize = 100;
    pub const NOTE_MAX: usize = 500;

    pub fn parse(method: &str, account_name: &str, account_number: &str, note: &str) -> WalletResult<Self> {
        let required = |label: &str, value: &str| -> WalletResult<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(WalletError::InvalidInput(format!("{label} is required")));
            }
            if value.chars().count() > Self::FIELD_MAX {
                return Err(WalletError::InvalidInput(format!(
                    "{label} must be at most {} characters",
                    Self::FIELD_MAX
                )));
            }
            Ok(value.to_string())
        };

        let note = note.trim();
        if note.chars().count() > Self::NOTE_MAX {
            return Err(WalletError::InvalidInput(format!(
                "Note must be at most {} characters",
                Self::NOTE_MAX
            )));
        }

        Ok(Self {
            method: required("Method", method)?,
            account_name: required("Account name", account_name)?,
            account_number: required("Account number", account_number)?,
            note: note.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub user_id: UserId,
    pub coins: i64,
    /// IDR paid out
    pub amount: i64,
    pub method: String,
    pub account_name: String,
    pub account_number: String,
    pub note: String,
    pub status: WithdrawalStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WithdrawalRequest {
    pub fn new(user_id: UserId, coins: i64, amount: i64, payout: PayoutDetails, now: DateTime<Utc>) -> Self {
        Self {
            id: WithdrawalId::new(),
            user_id,
            coins,
            amount,
            method: payout.method,
            account_name: payout.account_name,
            account_number: payout.account_number,
            note: payout.note,
            status: WithdrawalStatus::Pending,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ensure_pending(&self) -> WalletResult<()> {
        if self.status != WithdrawalStatus::Pending {
            return Err(WalletError::NotPending);
        }
        Ok(())
    }

    /// Returns the coins to refund (none)
    pub fn approve(&mut self, now: DateTime<Utc>) -> WalletResult<i64> {
        self.ensure_pending()?;
        self.status = WithdrawalStatus::Approved;
        self.processed_at = Some(now);
        self.updated_at = now;
        Ok(0)
    }

    /// Returns the coins to refund
    pub fn reject(&mut self, now: DateTime<Utc>) -> WalletResult<i64> {
        self.ensure_pending()?;
        self.status = WithdrawalStatus::Rejected;
        self.processed_at = Some(now);
        self.updated_at = now;
        Ok(self.coins)
    }
}

/// `Rp 5.000`
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}
