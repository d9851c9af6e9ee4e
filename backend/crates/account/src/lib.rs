//! Account Module
//!
//! Users, their coin wallet and the session identity every other module
//! relies on.
//!
//! - `domain/` - User entity, user name rules, ledger entry types and the pure balance rule
//! - `application/` - Use cases (authenticate, profile and rename, ledger, moderation)
//! - `infra/` - PostgreSQL repository and the shared `post_entry` helper
//! - `presentation/` - HTTP handlers and the `require_user` / `require_admin` middleware
//!
//! ## Wallet invariant
//! Every balance change goes through [`infra::ledger::post_entry`], which
//! updates `users.coin_balance` and appends a `coin_transactions` row inside
//! the caller's transaction. The sum of a user's ledger entries therefore
//! always equals their balance.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::AccountConfig;
pub use domain::entity::{CurrentUser, User};
pub use domain::ledger::{CoinTransactionType, apply_delta};
pub use error::{AccountError, AccountResult, LedgerError};
pub use infra::postgres::PgAccountRepository;
pub use presentation::middleware::{AccountMiddlewareState, require_admin, require_user};
pub use presentation::router::{account_admin_router, account_router};

#[cfg(test)]
mod tests;
