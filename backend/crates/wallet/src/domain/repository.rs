//! Repository Traits

use chrono::{DateTime, Utc};
use kernel::id::{UserId, WithdrawalId};

use crate::domain::gateway::Customer;
use crate::domain::topup::{ProcessorReport, Reconciliation, TopUpTransaction};
use crate::domain::withdrawal::{WithdrawalRequest, WithdrawalStatus};
use crate::error::WalletResult;

/// Transaction state after a report was applied
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub transaction: TopUpTransaction,
    pub outcome: Reconciliation,
}

#[trait_variant::make(TopUpRepository: Send)]
pub trait LocalTopUpRepository {
    /// Name and email sent to the payment gateway
    async fn customer(&self, user_id: UserId) -> WalletResult<Option<Customer>>;

    async fn create_pending(&self, transaction: &TopUpTransaction) -> WalletResult<()>;

    async fn set_snap_token(&self, order_id: &str, token: &str) -> WalletResult<()>;

    async fn find_by_order(&self, order_id: &str) -> WalletResult<Option<TopUpTransaction>>;

    /// Lock the transaction, run [`TopUpTransaction::apply_report`], persist
    /// it and credit `outcome.credit` coins with a `topup` ledger entry, all
    /// in one database transaction. `TransactionNotFound` if the order is
    /// unknown.
    async fn apply_report(
        &self,
        order_id: &str,
        report: &ProcessorReport,
        now: DateTime<Utc>,
    ) -> WalletResult<Reconciled>;

    /// Newest first
    async fn history(&self, user_id: UserId, limit: i64) -> WalletResult<Vec<TopUpTransaction>>;
}

#[trait_variant::make(WithdrawalRepository: Send)]
pub trait LocalWithdrawalRepository {
    /// Debit `request.coins` with a `withdraw_request` ledger entry and
    /// insert the request in one transaction.
    async fn create_withdrawal(&self, request: &WithdrawalRequest) -> WalletResult<()>;

    /// Newest first
    async fn withdrawals_of(&self, user_id: UserId, limit: i64) -> WalletResult<Vec<WithdrawalRequest>>;

    /// Newest first
    async fn list_withdrawals(&self, status: Option<WithdrawalStatus>, limit: i64) -> WalletResult<Vec<WithdrawalRequest>>;

    /// Lock the request, run `f`, persist it and refund the coins `f`
    /// returns with a `withdraw_refund` ledger entry, in one transaction.
    async fn process_withdrawal<F>(&self, id: WithdrawalId, f: F) -> WalletResult<WithdrawalRequest>
    where
        F: FnOnce(&mut WithdrawalRequest) -> WalletResult<i64> + Send;
}
