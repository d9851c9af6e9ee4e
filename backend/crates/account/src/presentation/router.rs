//! Account Routers

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::domain::repository::UserRepository;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, AccountAppState};

/// `/api/account` routes (expects `require_user` to be layered on top)
pub fn account_router(repo: PgAccountRepository, config: Arc<AccountConfig>) -> Router {
    account_router_generic(repo, config)
}

/// `/api/admin` user moderation routes (expects `require_user` and `require_admin`)
pub fn account_admin_router(repo: PgAccountRepository, config: Arc<AccountConfig>) -> Router {
    account_admin_router_generic(repo, config)
}

pub fn account_router_generic<R>(repo: R, config: Arc<AccountConfig>) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let state = AccountAppState {
        repo: Arc::new(repo),
        config,
    };

    Router::new()
        .route("/me", get(handlers::me::<R>).patch(handlers::update_me::<R>))
        .route("/ledger", get(handlers::ledger::<R>))
        .with_state(state)
}

pub fn account_admin_router_generic<R>(repo: R, config: Arc<AccountConfig>) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let state = AccountAppState {
        repo: Arc::new(repo),
        config,
    };

    Router::new()
        .route("/users/{user_id}/ban", post(handlers::ban_user::<R>))
        .route("/users/{user_id}/unban", post(handlers::unban_user::<R>))
        .with_state(state)
}
