//! HTTP Handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use kernel::id::UserId;

use crate::application::config::AccountConfig;
use crate::application::moderate_user::SetBanUseCase;
use crate::application::profile::{
    GetProfileUseCase, ListLedgerUseCase, UpdateProfileInput, UpdateProfileUseCase,
};
use crate::domain::entity::CurrentUser;
use crate::domain::repository::UserRepository;
use crate::error::AccountResult;
use crate::presentation::dto::{
    BanStatusResponse, LedgerEntryResponse, LedgerQuery, ProfileResponse, UpdateProfileRequest,
};

/// Shared state for account handlers
#[derive(Clone)]
pub struct AccountAppState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AccountConfig>,
}

/// GET /api/account/me
pub async fn me<R>(
    State(state): State<AccountAppState<R>>,
    Extension(user): Extension<CurrentUser>,
) -> AccountResult<Json<ProfileResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = GetProfileUseCase::new(state.repo.clone());
    let profile = use_case.execute(user.id).await?;
    Ok(Json(profile.into()))
}

/// PATCH /api/account/me
pub async fn update_me<R>(
    State(state): State<AccountAppState<R>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> AccountResult<Json<ProfileResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = UpdateProfileUseCase::new(state.repo.clone());
    let profile = use_case
        .execute(
            user.id,
            UpdateProfileInput {
                user_name: req.user_name,
            },
        )
        .await?;
    Ok(Json(profile.into()))
}

/// GET /api/account/ledger
pub async fn ledger<R>(
    State(state): State<AccountAppState<R>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<LedgerQuery>,
) -> AccountResult<Json<Vec<LedgerEntryResponse>>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = ListLedgerUseCase::new(state.repo.clone(), state.config.clone());
    let entries = use_case.execute(user.id, query.limit).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/users/{user_id}/ban
pub async fn ban_user<R>(
    State(state): State<AccountAppState<R>>,
    Extension(admin): Extension<CurrentUser>,
    Path(user_id): Path<UserId>,
) -> AccountResult<Json<BanStatusResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    set_ban(state, admin, user_id, true).await
}

/// POST /api/admin/users/{user_id}/unban
pub async fn unban_user<R>(
    State(state): State<AccountAppState<R>>,
    Extension(admin): Extension<CurrentUser>,
    Path(user_id): Path<UserId>,
) -> AccountResult<Json<BanStatusResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    set_ban(state, admin, user_id, false).await
}

async fn set_ban<R>(
    state: AccountAppState<R>,
    admin: CurrentUser,
    user_id: UserId,
    banned: bool,
) -> AccountResult<Json<BanStatusResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = SetBanUseCase::new(state.repo.clone());
    use_case.execute(&admin, user_id, banned).await?;
    Ok(Json(BanStatusResponse {
        user_id,
        is_banned: banned,
    }))
}
