//! API DTOs

use chrono::{DateTime, Utc};
use kernel::id::{CoinTransactionId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{CoinTransaction, User};

/// Response for GET /api/account/me
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub coin_balance: i64,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            user_name: user.user_name,
            email: user.email,
            coin_balance: user.coin_balance,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Request body for PATCH /api/account/me
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub user_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    pub id: CoinTransactionId,
    pub amount: i64,
    pub transaction_type: &'static str,
    pub created_at: DateTime<Utc>,
}

impl From<CoinTransaction> for LedgerEntryResponse {
    fn from(entry: CoinTransaction) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount,
            transaction_type: entry.transaction_type.as_str(),
            created_at: entry.created_at,
        }
    }
}

/// Response for the admin ban / unban endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanStatusResponse {
    pub user_id: UserId,
    pub is_banned: bool,
}
