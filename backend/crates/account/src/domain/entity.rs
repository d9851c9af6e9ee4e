//! Account Entities

use chrono::{DateTime, Utc};
use kernel::id::{CoinTransactionId, UserId};

use super::ledger::CoinTransactionType;

/// Registered user with their wallet
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    pub email: String,
    /// Never negative; only changed through the ledger
    pub coin_balance: i64,
    pub is_admin: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

/// Authenticated caller, inserted into request extensions by
/// [`crate::presentation::middleware::require_user`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub user_name: String,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Append-only ledger entry
#[derive(Debug, Clone)]
pub struct CoinTransaction {
    pub id: CoinTransactionId,
    pub user_id: UserId,
    /// Signed: credits positive, debits negative
    pub amount: i64,
    pub transaction_type: CoinTransactionType,
    pub created_at: DateTime<Utc>,
}
