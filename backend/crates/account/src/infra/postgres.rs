//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::{CoinTransactionId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{CoinTransaction, User};
use crate::domain::ledger::CoinTransactionType;
use crate::domain::repository::{UserNameUpdate, UserRepository};
use crate::domain::user_name::UserName;
use crate::error::AccountResult;

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgAccountRepository {
    async fn find_by_id(&self, user_id: UserId) -> AccountResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                user_name,
                email,
                coin_balance,
                is_admin,
                is_banned,
                created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_entity))
    }

    async fn update_user_name(
        &self,
        user_id: UserId,
        user_name: &UserName,
    ) -> AccountResult<UserNameUpdate> {
        let mut tx = self.pool.begin().await?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(user_name) = $2 AND user_id <> $1)",
        )
        .bind(user_id.as_uuid())
        .bind(user_name.canonical())
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Ok(UserNameUpdate::Taken);
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET user_name = $2
            WHERE user_id = $1
            RETURNING
                user_id,
                user_name,
                email,
                coin_balance,
                is_admin,
                is_banned,
                created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(user_name.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(match row {
            Some(row) => UserNameUpdate::Updated(row.into_entity()),
            None => UserNameUpdate::UserNotFound,
        })
    }

    async fn set_banned(&self, user_id: UserId, banned: bool) -> AccountResult<bool> {
        let updated = sqlx::query("UPDATE users SET is_banned = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(banned)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }

    async fn list_ledger(&self, user_id: UserId, limit: i64) -> AccountResult<Vec<CoinTransaction>> {
        let rows = sqlx::query_as::<_, CoinTransactionRow>(
            r#"
            SELECT
                coin_transaction_id,
                user_id,
                amount,
                transaction_type,
                created_at
            FROM coin_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(CoinTransactionRow::into_entity)
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    email: String,
    coin_balance: i64,
    is_admin: bool,
    is_banned: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_entity(self) -> User {
        User {
            id: UserId::from_uuid(self.user_id),
            user_name: self.user_name,
            email: self.email,
            coin_balance: self.coin_balance,
            is_admin: self.is_admin,
            is_banned: self.is_banned,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CoinTransactionRow {
    coin_transaction_id: Uuid,
    user_id: Uuid,
    amount: i64,
    transaction_type: String,
    created_at: DateTime<Utc>,
}

impl CoinTransactionRow {
    fn into_entity(self) -> Option<CoinTransaction> {
        let transaction_type = match self.transaction_type.parse::<CoinTransactionType>() {
            Ok(ty) => ty,
            Err(e) => {
                tracing::error!(error = %e, "Skipping ledger row with unknown type");
                return None;
            }
        };

        Some(CoinTransaction {
            id: CoinTransactionId::from_uuid(self.coin_transaction_id),
            user_id: UserId::from_uuid(self.user_id),
            amount: self.amount,
            transaction_type,
            created_at: self.created_at,
        })
    }
}
