//! Authenticate Use Case
//!
//! Resolves a session token into the calling [`CurrentUser`].

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AccountConfig;
use crate::domain::entity::CurrentUser;
use crate::domain::repository::UserRepository;
use crate::error::{AccountError, AccountResult};

pub struct AuthenticateUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AccountConfig>,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, token: Option<&str>, now_ms: i64) -> AccountResult<CurrentUser> {
        let Some(token) = token else {
            tracing::debug!("No session token");
            return Err(AccountError::Unauthenticated);
        };

        let claims = platform::token::verify(token, &self.config.session_secret, now_ms)
            .map_err(|e| {
                tracing::warn!(error = %e, "Session token rejected");
                AccountError::Unauthenticated
            })?;

        let user_id = UserId::from_uuid(claims.user_id);
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::Unauthenticated)?;

        if user.is_banned {
            tracing::warn!(user_id = %user_id, "Banned user rejected");
            return Err(AccountError::Banned);
        }

        Ok(CurrentUser::from(&user))
    }
}
