//! Wallet Routers

use axum::{
    Router,
    routing::{get, post},
};
use notification::{NotificationSink, PgNotificationRepository};
use std::sync::Arc;

use crate::application::config::WalletConfig;
use crate::domain::gateway::PaymentGateway;
use crate::infra::midtrans::MidtransGateway;
use crate::infra::postgres::PgWalletRepository;
use crate::presentation::handlers::{self, WalletAppState, WalletStore};

/// Processor webhook under `/api/topup`, unauthenticated (the payload is signed)
pub fn topup_public_router(
    repo: PgWalletRepository,
    gateway: MidtransGateway,
    sink: PgNotificationRepository,
    config: Arc<WalletConfig>,
) -> Router {
    topup_public_router_generic(repo, gateway, sink, config)
}

/// `/api/topup` routes (expects `require_user`)
pub fn topup_router(
    repo: PgWalletRepository,
    gateway: MidtransGateway,
    sink: PgNotificationRepository,
    config: Arc<WalletConfig>,
) -> Router {
    topup_router_generic(repo, gateway, sink, config)
}

/// `/api/withdrawals` routes (expects `require_user`)
pub fn withdrawal_router(
    repo: PgWalletRepository,
    gateway: MidtransGateway,
    sink: PgNotificationRepository,
    config: Arc<WalletConfig>,
) -> Router {
    withdrawal_router_generic(repo, gateway, sink, config)
}

/// Withdrawal review under `/api/admin` (expects `require_user` and `require_admin`)
pub fn wallet_admin_router(
    repo: PgWalletRepository,
    gateway: MidtransGateway,
    sink: PgNotificationRepository,
    config: Arc<WalletConfig>,
) -> Router {
    wallet_admin_router_generic(repo, gateway, sink, config)
}

fn state<R, G, N>(repo: R, gateway: G, sink: N, config: Arc<WalletConfig>) -> WalletAppState<R, G, N>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    WalletAppState {
        repo: Arc::new(repo),
        gateway: Arc::new(gateway),
        sink: Arc::new(sink),
        config,
    }
}

pub fn topup_public_router_generic<R, G, N>(repo: R, gateway: G, sink: N, config: Arc<WalletConfig>) -> Router
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    Router::new()
        .route("/notification", post(handlers::payment_notification::<R, G, N>))
        .with_state(state(repo, gateway, sink, config))
}

pub fn topup_router_generic<R, G, N>(repo: R, gateway: G, sink: N, config: Arc<WalletConfig>) -> Router
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(handlers::initiate_topup::<R, G, N>))
        .route("/history", get(handlers::topup_history::<R, G, N>))
        .route("/{order_id}", get(handlers::topup_status::<R, G, N>))
        .route("/{order_id}/confirm", post(handlers::confirm_topup::<R, G, N>))
        .with_state(state(repo, gateway, sink, config))
}

pub fn withdrawal_router_generic<R, G, N>(repo: R, gateway: G, sink: N, config: Arc<WalletConfig>) -> Router
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            post(handlers::request_withdrawal::<R, G, N>).get(handlers::withdrawal_history::<R, G, N>),
        )
        .with_state(state(repo, gateway, sink, config))
}

pub fn wallet_admin_router_generic<R, G, N>(repo: R, gateway: G, sink: N, config: Arc<WalletConfig>) -> Router
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    Router::new()
        .route("/withdrawals", get(handlers::list_withdrawals::<R, G, N>))
        .route(
            "/withdrawals/{withdrawal_id}/approve",
            post(handlers::approve_withdrawal::<R, G, N>),
        )
        .route(
            "/withdrawals/{withdrawal_id}/reject",
            post(handlers::reject_withdrawal::<R, G, N>),
        )
        .with_state(state(repo, gateway, sink, config))
}
