//! Wallet Module
//!
//! Coin top-ups through the Midtrans payment gateway and cash withdrawals.
//!
//! - `domain/` - Top-up and withdrawal entities, processor status mapping,
//!   webhook signature and the `PaymentGateway` port
//! - `application/` - Use cases (initiate, webhook, poll, history, withdrawals)
//! - `infra/` - PostgreSQL repository and the Midtrans HTTP client
//! - `presentation/` - HTTP handlers and routers
//!
//! ## Reconciliation
//! A pending top-up is settled either by the signed webhook or by the owner
//! polling the gateway. Both paths end in the same guarded transition
//! ([`domain::topup::TopUpTransaction::apply_report`]) executed under a row
//! lock, so coins are credited exactly once no matter which path observes
//! the payment first.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::{CoinPackage, MidtransEnvironment, WalletConfig};
pub use domain::gateway::{GatewayError, PaymentGateway};
pub use error::{WalletError, WalletResult};
pub use infra::midtrans::MidtransGateway;
pub use infra::postgres::PgWalletRepository;
pub use presentation::router::{
    topup_public_router, topup_router, wallet_admin_router, withdrawal_router,
};
