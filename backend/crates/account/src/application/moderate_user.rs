//! Ban / Unban Use Case (admin only)

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::CurrentUser;
use crate::domain::repository::UserRepository;
use crate::error::{AccountError, AccountResult};

pub struct SetBanUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> SetBanUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        admin: &CurrentUser,
        target: UserId,
        banned: bool,
    ) -> AccountResult<()> {
        if !admin.is_admin {
            return Err(AccountError::AdminRequired);
        }
        if admin.id == target {
            return Err(AccountError::SelfModeration);
        }

        if !self.repo.set_banned(target, banned).await? {
            return Err(AccountError::UserNotFound);
        }

        tracing::info!(admin_id = %admin.id, user_id = %target, banned, "User ban status changed");
        Ok(())
    }
}
