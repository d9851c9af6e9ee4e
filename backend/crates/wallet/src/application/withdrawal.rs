//! Withdrawal Use Cases

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{UserId, WithdrawalId};
use notification::{NewNotification, NotificationKind, NotificationSink, deliver};

use crate::application::config::WalletConfig;
use crate::domain::repository::WithdrawalRepository;
use crate::domain::withdrawal::{
    PayoutDetails, WithdrawalRequest, WithdrawalStatus, format_rupiah,
};
use crate::error::WalletResult;

#[derive(Debug, Clone)]
pub struct WithdrawalInput {
    pub coins: i64,
    pub method: String,
    pub account_name: String,
    pub account_number: String,
    pub note: String,
}

pub struct RequestWithdrawalUseCase<R>
where
    R: WithdrawalRepository,
{
    repo: Arc<R>,
    config: Arc<WalletConfig>,
}

impl<R> RequestWithdrawalUseCase<R>
where
    R: WithdrawalRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<WalletConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, user_id: UserId, input: WithdrawalInput) -> WalletResult<WithdrawalRequest> {
        let amount = self.config.withdrawal_amount(input.coins)?;
        let payout = PayoutDetails::parse(
            &input.method,
            &input.account_name,
            &input.account_number,
            &input.note,
        )?;

        let request = WithdrawalRequest::new(user_id, input.coins, amount, payout, Utc::now());
        self.repo.create_withdrawal(&request).await?;

        tracing::info!(
            withdrawal_id = %request.id,
            user_id = %user_id,
            coins = request.coins,
            amount = request.amount,
            "Withdrawal requested"
        );
        Ok(request)
    }
}

pub struct WithdrawalHistoryUseCase<R>
where
    R: WithdrawalRepository,
{
    repo: Arc<R>,
    config: Arc<WalletConfig>,
}

impl<R> WithdrawalHistoryUseCase<R>
where
    R: WithdrawalRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<WalletConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, user_id: UserId) -> WalletResult<Vec<WithdrawalRequest>> {
        self.repo
            .withdrawals_of(user_id, self.config.history_limit)
            .await
    }
}

/// Admin side of the withdrawal queue
pub struct ReviewWithdrawalsUseCase<R, N>
where
    R: WithdrawalRepository,
    N: NotificationSink + Sync,
{
    repo: Arc<R>,
    sink: Arc<N>,
    config: Arc<WalletConfig>,
}

impl<R, N> ReviewWithdrawalsUseCase<R, N>
where
    R: WithdrawalRepository,
    N: NotificationSink + Sync,
{
    pub fn new(repo: Arc<R>, sink: Arc<N>, config: Arc<WalletConfig>) -> Self {
        Self { repo, sink, config }
    }

    pub async fn list(&self, status: Option<WithdrawalStatus>) -> WalletResult<Vec<WithdrawalRequest>> {
        self.repo
            .list_withdrawals(status, self.config.admin_page_limit)
            .await
    }

    pub async fn approve(&self, id: WithdrawalId) -> WalletResult<WithdrawalRequest> {
        let request = self
            .repo
            .process_withdrawal(id, |request| request.approve(Utc::now()))
            .await?;

        tracing::info!(withdrawal_id = %id, amount = request.amount, "Withdrawal approved");

        let notification = NewNotification::new(
            request.user_id,
            NotificationKind::SystemUpdate,
            "Withdrawal Approved",
            format!(
                "Your withdrawal request for {} has been approved and is being processed.",
                format_rupiah(request.amount)
            ),
        )
        .with_reference_url("/wallet");
        deliver(self.sink.as_ref(), vec![notification]).await;

        Ok(request)
    }

    /// Rejects and refunds the debited coins
    pub async fn reject(&self, id: WithdrawalId) -> WalletResult<WithdrawalRequest> {
        let request = self
            .repo
            .process_withdrawal(id, |request| request.reject(Utc::now()))
            .await?;

        tracing::info!(withdrawal_id = %id, refunded = request.coins, "Withdrawal rejected");

        let notification = NewNotification::new(
            request.user_id,
            NotificationKind::Warning,
            "Withdrawal Rejected",
            format!(
                "Your withdrawal request for {} has been rejected. The coins have been refunded to your balance.",
                format_rupiah(request.amount)
            ),
        )
        .with_reference_url("/wallet");
        deliver(self.sink.as_ref(), vec![notification]).await;

        Ok(request)
    }
}
