//! Repository Traits

use crate::domain::entity::{CoinTransaction, User};
use crate::domain::user_name::UserName;
use crate::error::AccountResult;
use kernel::id::UserId;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AccountResult<Option<User>>;

    /// Returns `false` when the user does not exist
    /// Renames the user. Returns `Taken` when another account already
    /// holds the name (case-insensitive).
    async fn update_user_name(
        &self,
        user_id: UserId,
        user_name: &UserName,
    ) -> AccountResult<UserNameUpdate>;

    async fn set_banned(&self, user_id: UserId, banned: bool) -> AccountResult<bool>;

    /// Latest entries first
    async fn list_ledger(&self, user_id: UserId, limit: i64) -> AccountResult<Vec<CoinTransaction>>;
}

/// Outcome of [`LocalUserRepository::update_user_name`]
#[derive(Debug, Clone)]
pub enum UserNameUpdate {
    Updated(User),
    Taken,
    UserNotFound,
}
