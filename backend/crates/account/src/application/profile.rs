//! Profile and ledger queries

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AccountConfig;
use crate::domain::entity::{CoinTransaction, User};
use crate::domain::repository::{UserNameUpdate, UserRepository};
use crate::domain::user_name::UserName;
use crate::error::{AccountError, AccountResult};

pub struct GetProfileUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> GetProfileUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: UserId) -> AccountResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }
}

pub struct UpdateProfileInput {
    pub user_name: String,
}

pub struct UpdateProfileUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateProfileUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: UserId, input: UpdateProfileInput) -> AccountResult<User> {
        let user_name = UserName::new(&input.user_name)?;

        match self.repo.update_user_name(user_id, &user_name).await? {
            UserNameUpdate::Updated(user) => {
                tracing::info!(user_id = %user_id, user_name = %user_name, "User renamed");
                Ok(user)
            }
            UserNameUpdate::Taken => Err(AccountError::UserNameTaken),
            UserNameUpdate::UserNotFound => Err(AccountError::UserNotFound),
        }
    }
}

pub struct ListLedgerUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AccountConfig>,
}

impl<R> ListLedgerUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        limit: Option<i64>,
    ) -> AccountResult<Vec<CoinTransaction>> {
        let limit = self.config.clamp_ledger_limit(limit);
        self.repo.list_ledger(user_id, limit).await
    }
}
