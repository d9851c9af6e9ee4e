//! Ledger rules

use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Why a balance changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinTransactionType {
    TopUp,
    WithdrawRequest,
    WithdrawRefund,
    BountyEscrow,
    BountyPayout,
    BountyRefund,
    HighlightPurchase,
}

impl CoinTransactionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CoinTransactionType::TopUp => "topup",
            CoinTransactionType::WithdrawRequest => "withdraw_request",
            CoinTransactionType::WithdrawRefund => "withdraw_refund",
            CoinTransactionType::BountyEscrow => "bounty_escrow",
            CoinTransactionType::BountyPayout => "bounty_payout",
            CoinTransactionType::BountyRefund => "bounty_refund",
            CoinTransactionType::HighlightPurchase => "highlight_purchase",
        }
    }
}

impl fmt::Display for CoinTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoinTransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topup" => Ok(CoinTransactionType::TopUp),
            "withdraw_request" => Ok(CoinTransactionType::WithdrawRequest),
            "withdraw_refund" => Ok(CoinTransactionType::WithdrawRefund),
            "bounty_escrow" => Ok(CoinTransactionType::BountyEscrow),
            "bounty_payout" => Ok(CoinTransactionType::BountyPayout),
            "bounty_refund" => Ok(CoinTransactionType::BountyRefund),
            "highlight_purchase" => Ok(CoinTransactionType::HighlightPurchase),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// New balance after applying `delta`.
///
/// A debit that would take the balance below zero is rejected; the balance
/// is left untouched by the caller in that case.
pub fn apply_delta(balance: i64, delta: i64) -> Result<i64, LedgerError> {
    let next = balance.checked_add(delta).ok_or(LedgerError::Overflow)?;
    if next < 0 {
        return Err(LedgerError::InsufficientBalance {
            balance,
            required: -delta,
        });
    }
    Ok(next)
}
