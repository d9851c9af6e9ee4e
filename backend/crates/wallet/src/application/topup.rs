//! Top-up Use Cases
//!
//! Initiation persists the pending row before calling the gateway, so a
//! gateway outage leaves a pending transaction behind. The webhook and the
//! owner's poll both settle through `TopUpRepository::apply_report`; the
//! gateway is never called while a database transaction is open.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;
use notification::{NewNotification, NotificationKind, NotificationSink, deliver};

use crate::application::config::WalletConfig;
use crate::domain::gateway::{LineItem, PaymentGateway, PaymentSessionRequest};
use crate::domain::repository::{Reconciled, TopUpRepository};
use crate::domain::signature::SignedFields;
use crate::domain::topup::{ProcessorReport, TopUpTransaction};
use crate::error::{WalletError, WalletResult};

/// Result of starting a purchase
#[derive(Debug, Clone)]
pub struct InitiatedTopUp {
    pub order_id: String,
    pub snap_token: String,
    /// Public key the Snap popup is opened with
    pub client_key: String,
    pub amount: i64,
    pub price: i64,
}

pub struct InitiateTopUpUseCase<R, G>
where
    R: TopUpRepository,
    G: PaymentGateway,
{
    repo: Arc<R>,
    gateway: Arc<G>,
    config: Arc<WalletConfig>,
}

impl<R, G> InitiateTopUpUseCase<R, G>
where
    R: TopUpRepository,
    G: PaymentGateway + Sync,
{
    pub fn new(repo: Arc<R>, gateway: Arc<G>, config: Arc<WalletConfig>) -> Self {
        Self {
            repo,
            gateway,
            config,
        }
    }

    pub async fn execute(&self, user_id: UserId, coins: i64) -> WalletResult<InitiatedTopUp> {
        let price = self.config.price_for(coins)?;
        let customer = self
            .repo
            .customer(user_id)
            .await?
            .ok_or(WalletError::UserNotFound)?;

        let transaction = TopUpTransaction::pending(user_id, coins, price, Utc::now());
        self.repo.create_pending(&transaction).await?;

        let request = PaymentSessionRequest {
            order_id: transaction.order_id.clone(),
            gross_amount: price,
            customer,
            items: vec![LineItem {
                id: format!("COIN-{coins}"),
                name: format!("{coins} TemuIn Coins"),
                price,
                quantity: 1,
            }],
        };

        let snap_token = self
            .gateway
            .create_payment_session(&request)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    order_id = %transaction.order_id,
                    error = %e,
                    "Payment session failed; transaction left pending"
                );
            })?;

        self.repo
            .set_snap_token(&transaction.order_id, &snap_token)
            .await?;

        tracing::info!(
            order_id = %transaction.order_id,
            user_id = %user_id,
            coins,
            price,
            "Top-up initiated"
        );

        Ok(InitiatedTopUp {
            order_id: transaction.order_id,
            snap_token,
            client_key: self.config.client_key.clone(),
            amount: coins,
            price,
        })
    }
}

/// Webhook body after signature-relevant fields were rendered as text
#[derive(Debug, Clone)]
pub struct ProcessorNotification {
    pub signed: SignedFields,
    pub report: ProcessorReport,
}

/// Signed webhook from the payment processor
pub struct HandleNotificationUseCase<R, N>
where
    R: TopUpRepository,
    N: NotificationSink + Sync,
{
    repo: Arc<R>,
    sink: Arc<N>,
    config: Arc<WalletConfig>,
}

impl<R, N> HandleNotificationUseCase<R, N>
where
    R: TopUpRepository,
    N: NotificationSink + Sync,
{
    pub fn new(repo: Arc<R>, sink: Arc<N>, config: Arc<WalletConfig>) -> Self {
        Self { repo, sink, config }
    }

    /// The signature is checked before anything is read or written.
    pub async fn execute(&self, notification: ProcessorNotification) -> WalletResult<Reconciled> {
        let order_id = notification.signed.order_id.as_str();
        if !notification.signed.verify(&self.config.server_key) {
            tracing::warn!(order_id = %order_id, "Top-up webhook signature mismatch");
            return Err(WalletError::InvalidSignature);
        }

        settle(
            self.repo.as_ref(),
            self.sink.as_ref(),
            order_id,
            &notification.report,
            "webhook",
        )
        .await
    }
}

/// Owner asks the server to re-check the gateway, for when the webhook is
/// late or never arrives.
pub struct PollTopUpUseCase<R, G, N>
where
    R: TopUpRepository,
    G: PaymentGateway,
    N: NotificationSink + Sync,
{
    repo: Arc<R>,
    gateway: Arc<G>,
    sink: Arc<N>,
}

impl<R, G, N> PollTopUpUseCase<R, G, N>
where
    R: TopUpRepository,
    G: PaymentGateway + Sync,
    N: NotificationSink + Sync,
{
    pub fn new(repo: Arc<R>, gateway: Arc<G>, sink: Arc<N>) -> Self {
        Self { repo, gateway, sink }
    }

    pub async fn execute(&self, user_id: UserId, order_id: &str) -> WalletResult<Reconciled> {
        let transaction = self
            .repo
            .find_by_order(order_id)
            .await?
            .ok_or(WalletError::TransactionNotFound)?;
        if transaction.user_id != user_id {
            tracing::warn!(order_id = %order_id, user_id = %user_id, "Poll of foreign top-up");
            return Err(WalletError::Unauthorized);
        }

        let report = self.gateway.query_transaction_status(order_id).await?;

        settle(self.repo.as_ref(), self.sink.as_ref(), order_id, &report, "poll").await
    }
}

/// The one settlement step shared by webhook and poll
async fn settle<R, N>(
    repo: &R,
    sink: &N,
    order_id: &str,
    report: &ProcessorReport,
    source: &'static str,
) -> WalletResult<Reconciled>
where
    R: TopUpRepository,
    N: NotificationSink + Sync,
{
    let reconciled = repo.apply_report(order_id, report, Utc::now()).await?;
    let outcome = reconciled.outcome;

    if outcome.previous != outcome.current {
        tracing::info!(
            order_id = %order_id,
            source,
            from = outcome.previous.as_str(),
            to = outcome.current.as_str(),
            credited = outcome.credit,
            "Top-up reconciled"
        );
    } else {
        tracing::debug!(
            order_id = %order_id,
            source,
            status = outcome.current.as_str(),
            processor_status = %report.transaction_status,
            "Top-up report without status change"
        );
    }

    if outcome.credit > 0 {
        let transaction = &reconciled.transaction;
        let notification = NewNotification::new(
            transaction.user_id,
            NotificationKind::TopUp,
            "Top-up successful",
            format!("{} coins were added to your wallet.", outcome.credit),
        )
        .with_reference_url("/wallet");
        deliver(sink, vec![notification]).await;
    }

    Ok(reconciled)
}

/// Local reads of the caller's own top-ups
pub struct TopUpQueryUseCase<R>
where
    R: TopUpRepository,
{
    repo: Arc<R>,
    config: Arc<WalletConfig>,
}

impl<R> TopUpQueryUseCase<R>
where
    R: TopUpRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<WalletConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn history(&self, user_id: UserId) -> WalletResult<Vec<TopUpTransaction>> {
        self.repo.history(user_id, self.config.history_limit).await
    }

    /// Stored status only; the gateway is not contacted
    pub async fn status(&self, user_id: UserId, order_id: &str) -> WalletResult<TopUpTransaction> {
        self.repo
            .find_by_order(order_id)
            .await?
            .filter(|t| t.user_id == user_id)
            .ok_or(WalletError::TransactionNotFound)
    }
}
