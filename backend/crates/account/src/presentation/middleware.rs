//! Session Middleware
//!
//! `require_user` must wrap every authenticated router; `require_admin` is
//! layered inside it and only reads what `require_user` inserted.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::application::authenticate::AuthenticateUseCase;
use crate::application::config::AccountConfig;
use crate::domain::entity::CurrentUser;
use crate::domain::repository::UserRepository;
use crate::error::AccountError;

/// Middleware state
#[derive(Clone)]
pub struct AccountMiddlewareState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AccountConfig>,
}

/// Rejects requests without a valid session (401) or from banned users
/// (403), otherwise inserts [`CurrentUser`] into the request extensions.
pub async fn require_user<R>(
    State(state): State<AccountMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AccountError>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let token =
        platform::cookie::extract_session_token(req.headers(), &state.config.session_cookie_name);

    let use_case = AuthenticateUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case
        .execute(token.as_deref(), Utc::now().timestamp_millis())
        .await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Rejects non-admin callers with 403.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, AccountError> {
    let caller = req
        .extensions()
        .get::<CurrentUser>()
        .map(|user| (user.id, user.is_admin));

    match caller {
        Some((_, true)) => Ok(next.run(req).await),
        Some((user_id, false)) => {
            tracing::warn!(user_id = %user_id, path = %req.uri().path(), "Admin route denied");
            Err(AccountError::AdminRequired)
        }
        None => Err(AccountError::Unauthenticated),
    }
}
