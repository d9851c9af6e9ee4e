//! PostgreSQL Repository Implementation

use account::CoinTransactionType;
use account::infra::ledger::post_entry;
use chrono::{DateTime, Utc};
use kernel::id::{TopUpId, UserId, WithdrawalId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::gateway::Customer;
use crate::domain::repository::{Reconciled, TopUpRepository, WithdrawalRepository};
use crate::domain::topup::{ProcessorReport, TopUpTransaction};
use crate::domain::withdrawal::{WithdrawalRequest, WithdrawalStatus};
use crate::error::{WalletError, WalletResult};

const TOPUP_COLUMNS: &str = r#"
    topup_id,
    order_id,
    user_id,
    amount,
    price,
    status,
    payment_type,
    transaction_time,
    snap_token,
    created_at,
    updated_at
"#;

const WITHDRAWAL_COLUMNS: &str = r#"
    withdrawal_id,
    user_id,
    coins,
    amount,
    method,
    account_name,
    account_number,
    note,
    status,
    processed_at,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct PgWalletRepository {
    pool: PgPool,
}

impl PgWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TopUpRepository for PgWalletRepository {
    async fn customer(&self, user_id: UserId) -> WalletResult<Option<Customer>> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT user_name, email FROM users WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(name, email)| Customer { name, email }))
    }

    async fn create_pending(&self, transaction: &TopUpTransaction) -> WalletResult<()> {
        sqlx::query(
            r#"
            INSERT INTO topup_transactions (
                topup_id,
                order_id,
                user_id,
                amount,
                price,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(&transaction.order_id)
        .bind(transaction.user_id.as_uuid())
        .bind(transaction.amount)
        .bind(transaction.price)
        .bind(transaction.status.as_str())
        .bind(transaction.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_snap_token(&self, order_id: &str, token: &str) -> WalletResult<()> {
        sqlx::query(
            "UPDATE topup_transactions SET snap_token = $2, updated_at = NOW() WHERE order_id = $1",
        )
        .bind(order_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_order(&self, order_id: &str) -> WalletResult<Option<TopUpTransaction>> {
        let sql = format!("SELECT {TOPUP_COLUMNS} FROM topup_transactions WHERE order_id = $1");
        sqlx::query_as::<_, TopUpRow>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .map(TopUpRow::into_entity)
            .transpose()
    }

    async fn apply_report(
        &self,
        order_id: &str,
        report: &ProcessorReport,
        now: DateTime<Utc>,
    ) -> WalletResult<Reconciled> {
        let mut tx = self.pool.begin().await?;

        // Serializes webhook and poll for the same order
        let sql = format!(
            "SELECT {TOPUP_COLUMNS} FROM topup_transactions WHERE order_id = $1 FOR UPDATE"
        );
        let mut transaction = sqlx::query_as::<_, TopUpRow>(&sql)
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WalletError::TransactionNotFound)?
            .into_entity()?;

        let outcome = transaction.apply_report(report, now);

        sqlx::query(
            r#"
            UPDATE topup_transactions SET
                status = $2,
                payment_type = $3,
                transaction_time = $4,
                updated_at = $5
            WHERE topup_id = $1
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.status.as_str())
        .bind(&transaction.payment_type)
        .bind(transaction.transaction_time)
        .bind(transaction.updated_at)
        .execute(&mut *tx)
        .await?;

        if outcome.credit > 0 {
            post_entry(
                &mut *tx,
                transaction.user_id,
                outcome.credit,
                CoinTransactionType::TopUp,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(Reconciled {
            transaction,
            outcome,
        })
    }

    async fn history(&self, user_id: UserId, limit: i64) -> WalletResult<Vec<TopUpTransaction>> {
        let sql = format!(
            r#"
            SELECT {TOPUP_COLUMNS}
            FROM topup_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, TopUpRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TopUpRow::into_entity).collect()
    }
}

impl WithdrawalRepository for PgWalletRepository {
    async fn create_withdrawal(&self, request: &WithdrawalRequest) -> WalletResult<()> {
        let mut tx = self.pool.begin().await?;

        post_entry(
            &mut *tx,
            request.user_id,
            -request.coins,
            CoinTransactionType::WithdrawRequest,
        )
        .await?;

        sqlx::query(
            r#"
            INSERT INTO withdrawal_requests (
                withdrawal_id,
                user_id,
                coins,
                amount,
                method,
                account_name,
                account_number,
                note,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.user_id.as_uuid())
        .bind(request.coins)
        .bind(request.amount)
        .bind(&request.method)
        .bind(&request.account_name)
        .bind(&request.account_number)
        .bind(&request.note)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn withdrawals_of(&self, user_id: UserId, limit: i64) -> WalletResult<Vec<WithdrawalRequest>> {
        let sql = format!(
            r#"
            SELECT {WITHDRAWAL_COLUMNS}
            FROM withdrawal_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, WithdrawalRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(WithdrawalRow::into_entity).collect()
    }

    async fn list_withdrawals(&self, status: Option<WithdrawalStatus>, limit: i64) -> WalletResult<Vec<WithdrawalRequest>> {
        let sql = format!(
            r#"
            SELECT {WITHDRAWAL_COLUMNS}
            FROM withdrawal_requests
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, WithdrawalRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(WithdrawalRow::into_entity).collect()
    }

    async fn process_withdrawal<F>(&self, id: WithdrawalId, f: F) -> WalletResult<WithdrawalRequest>
    where
        F: FnOnce(&mut WithdrawalRequest) -> WalletResult<i64> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawal_requests WHERE withdrawal_id = $1 FOR UPDATE"
        );
        let mut request = sqlx::query_as::<_, WithdrawalRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(WalletError::WithdrawalNotFound)?
            .into_entity()?;

        let refund = f(&mut request)?;

        sqlx::query(
            r#"
            UPDATE withdrawal_requests SET
                status = $2,
                processed_at = $3,
                updated_at = $4
            WHERE withdrawal_id = $1
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.status.as_str())
        .bind(request.processed_at)
        .bind(request.updated_at)
        .execute(&mut *tx)
        .await?;

        if refund > 0 {
            post_entry(
                &mut *tx,
                request.user_id,
                refund,
                CoinTransactionType::WithdrawRefund,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(request)
    }
}

#[derive(sqlx::FromRow)]
struct TopUpRow {
    topup_id: Uuid,
    order_id: String,
    user_id: Uuid,
    amount: i64,
    price: i64,
    status: String,
    payment_type: Option<String>,
    transaction_time: Option<DateTime<Utc>>,
    snap_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TopUpRow {
    fn into_entity(self) -> WalletResult<TopUpTransaction> {
        Ok(TopUpTransaction {
            id: TopUpId::from_uuid(self.topup_id),
            order_id: self.order_id,
            user_id: UserId::from_uuid(self.user_id),
            amount: self.amount,
            price: self.price,
            status: self.status.parse()?,
            payment_type: self.payment_type,
            transaction_time: self.transaction_time,
            snap_token: self.snap_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct WithdrawalRow {
    withdrawal_id: Uuid,
    user_id: Uuid,
    coins: i64,
    amount: i64,
    method: String,
    account_name: String,
    account_number: String,
    note: String,
    status: String,
    processed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WithdrawalRow {
    fn into_entity(self) -> WalletResult<WithdrawalRequest> {
        Ok(WithdrawalRequest {
            id: WithdrawalId::from_uuid(self.withdrawal_id),
            user_id: UserId::from_uuid(self.user_id),
            coins: self.coins,
            amount: self.amount,
            method: self.method,
            account_name: self.account_name,
            account_number: self.account_number,
            note: self.note,
            status: self.status.parse()?,
            processed_at: self.processed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
