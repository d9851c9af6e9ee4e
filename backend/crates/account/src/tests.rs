//! Unit tests for the account crate

#[cfg(test)]
pub(crate) mod support {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use kernel::id::{CoinTransactionId, UserId};

    use crate::domain::entity::{CoinTransaction, User};
    use crate::domain::ledger::{CoinTransactionType, apply_delta};
    use crate::domain::repository::{UserNameUpdate, UserRepository};
    use crate::domain::user_name::UserName;
    use crate::error::AccountResult;

    #[derive(Clone, Default)]
    pub struct InMemoryUsers {
        pub users: Arc<Mutex<HashMap<UserId, User>>>,
        pub ledger: Arc<Mutex<Vec<CoinTransaction>>>,
    }

    impl InMemoryUsers {
        pub fn add(&self, name: &str, balance: i64, is_admin: bool) -> UserId {
            let id = UserId::new();
            self.users.lock().unwrap().insert(
                id,
                User {
                    id,
                    user_name: name.to_string(),
                    email: format!("{name}@temuin.test"),
                    coin_balance: balance,
                    is_admin,
                    is_banned: false,
                    created_at: Utc::now(),
                },
            );
            id
        }

        pub fn post(&self, user_id: UserId, delta: i64, ty: CoinTransactionType) {
            let mut users = self.users.lock().unwrap();
            let user = users.get_mut(&user_id).unwrap();
            user.coin_balance = apply_delta(user.coin_balance, delta).unwrap();
            self.ledger.lock().unwrap().push(CoinTransaction {
                id: CoinTransactionId::new(),
                user_id,
                amount: delta,
                transaction_type: ty,
                created_at: Utc::now(),
            });
        }
    }

    impl UserRepository for InMemoryUsers {
        async fn find_by_id(&self, user_id: UserId) -> AccountResult<Option<User>> {
            Ok(self.users.lock().unwrap().get(&user_id).cloned())
        }

        async fn update_user_name(
            &self,
            user_id: UserId,
            user_name: &UserName,
        ) -> AccountResult<UserNameUpdate> {
            let mut users = self.users.lock().unwrap();
            let canonical = user_name.canonical();
            if users
                .values()
                .any(|u| u.id != user_id && u.user_name.to_lowercase() == canonical)
            {
                return Ok(UserNameUpdate::Taken);
            }
            Ok(match users.get_mut(&user_id) {
                Some(user) => {
                    user.user_name = user_name.as_str().to_string();
                    UserNameUpdate::Updated(user.clone())
                }
                None => UserNameUpdate::UserNotFound,
            })
        }

        async fn set_banned(&self, user_id: UserId, banned: bool) -> AccountResult<bool> {
            let mut users = self.users.lock().unwrap();
            match users.get_mut(&user_id) {
                Some(user) => {
                    user.is_banned = banned;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn list_ledger(
            &self,
            user_id: UserId,
            limit: i64,
        ) -> AccountResult<Vec<CoinTransaction>> {
            Ok(self
                .ledger
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|entry| entry.user_id == user_id)
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod authenticate_tests {
    use std::sync::Arc;

    use super::support::InMemoryUsers;
    use crate::application::authenticate::AuthenticateUseCase;
    use crate::application::config::AccountConfig;
    use crate::domain::repository::UserRepository;
    use crate::error::AccountError;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn setup() -> (InMemoryUsers, Arc<AccountConfig>) {
        (InMemoryUsers::default(), Arc::new(AccountConfig::with_random_secret()))
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let (repo, config) = setup();
        let user_id = repo.add("rani", 0, false);
        let token = platform::token::sign(
            *user_id.as_uuid(),
            NOW_MS + 60_000,
            &config.session_secret,
        );

        let use_case = AuthenticateUseCase::new(Arc::new(repo), config);
        let current = use_case.execute(Some(&token), NOW_MS).await.unwrap();
        assert_eq!(current.id, user_id);
        assert_eq!(current.user_name, "rani");
        assert!(!current.is_admin);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthenticated() {
        let (repo, config) = setup();
        let use_case = AuthenticateUseCase::new(Arc::new(repo), config);
        let err = use_case.execute(None, NOW_MS).await.unwrap_err();
        assert!(matches!(err, AccountError::Unauthenticated));
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_token_for_unknown_user_is_unauthenticated() {
        let (repo, config) = setup();
        let token = platform::token::sign(
            uuid::Uuid::new_v4(),
            NOW_MS + 60_000,
            &config.session_secret,
        );
        let use_case = AuthenticateUseCase::new(Arc::new(repo), config);
        let err = use_case.execute(Some(&token), NOW_MS).await.unwrap_err();
        assert!(matches!(err, AccountError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthenticated() {
        let (repo, config) = setup();
        let user_id = repo.add("rani", 0, false);
        let token = platform::token::sign(*user_id.as_uuid(), NOW_MS, &config.session_secret);
        let use_case = AuthenticateUseCase::new(Arc::new(repo), config);
        assert!(matches!(
            use_case.execute(Some(&token), NOW_MS).await,
            Err(AccountError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_banned_user_is_forbidden() {
        let (repo, config) = setup();
        let user_id = repo.add("troll", 0, false);
        repo.set_banned(user_id, true).await.unwrap();
        let token = platform::token::sign(
            *user_id.as_uuid(),
            NOW_MS + 60_000,
            &config.session_secret,
        );

        let use_case = AuthenticateUseCase::new(Arc::new(repo), config);
        let err = use_case.execute(Some(&token), NOW_MS).await.unwrap_err();
        assert!(matches!(err, AccountError::Banned));
        assert_eq!(err.status_code(), 403);
    }
}

#[cfg(test)]
mod moderation_tests {
    use std::sync::Arc;

    use kernel::id::UserId;

    use super::support::InMemoryUsers;
    use crate::application::moderate_user::SetBanUseCase;
    use crate::domain::entity::CurrentUser;
    use crate::error::AccountError;

    fn admin(repo: &InMemoryUsers) -> CurrentUser {
        let id = repo.add("admin", 0, true);
        CurrentUser {
            id,
            user_name: "admin".into(),
            is_admin: true,
        }
    }

    #[tokio::test]
    async fn test_ban_then_unban() {
        let repo = InMemoryUsers::default();
        let admin = admin(&repo);
        let target = repo.add("troll", 0, false);
        let use_case = SetBanUseCase::new(Arc::new(repo.clone()));

        use_case.execute(&admin, target, true).await.unwrap();
        assert!(repo.users.lock().unwrap()[&target].is_banned);

        use_case.execute(&admin, target, false).await.unwrap();
        assert!(!repo.users.lock().unwrap()[&target].is_banned);
    }

    #[tokio::test]
    async fn test_admin_cannot_ban_self() {
        let repo = InMemoryUsers::default();
        let admin = admin(&repo);
        let use_case = SetBanUseCase::new(Arc::new(repo.clone()));

        let err = use_case.execute(&admin, admin.id, true).await.unwrap_err();
        assert!(matches!(err, AccountError::SelfModeration));
        assert!(!repo.users.lock().unwrap()[&admin.id].is_banned);
    }

    #[tokio::test]
    async fn test_non_admin_rejected() {
        let repo = InMemoryUsers::default();
        let caller_id = repo.add("user", 0, false);
        let target = repo.add("other", 0, false);
        let caller = CurrentUser {
            id: caller_id,
            user_name: "user".into(),
            is_admin: false,
        };

        let use_case = SetBanUseCase::new(Arc::new(repo.clone()));
        let err = use_case.execute(&caller, target, true).await.unwrap_err();
        assert!(matches!(err, AccountError::AdminRequired));
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let repo = InMemoryUsers::default();
        let admin = admin(&repo);
        let use_case = SetBanUseCase::new(Arc::new(repo));
        let err = use_case.execute(&admin, UserId::new(), true).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}

#[cfg(test)]
mod ledger_tests {
    use std::sync::Arc;

    use super::support::InMemoryUsers;
    use crate::application::config::AccountConfig;
    use crate::application::profile::ListLedgerUseCase;
    use crate::domain::ledger::CoinTransactionType;

    #[test]
    fn test_ledger_limit_clamped() {
        let config = AccountConfig::default();
        assert_eq!(config.clamp_ledger_limit(None), 20);
        assert_eq!(config.clamp_ledger_limit(Some(0)), 1);
        assert_eq!(config.clamp_ledger_limit(Some(5_000)), 100);
    }

    #[tokio::test]
    async fn test_ledger_sum_equals_balance() {
        let repo = InMemoryUsers::default();
        let user_id = repo.add("rani", 0, false);
        repo.post(user_id, 500, CoinTransactionType::TopUp);
        repo.post(user_id, -100, CoinTransactionType::BountyEscrow);
        repo.post(user_id, -200, CoinTransactionType::WithdrawRequest);

        let use_case =
            ListLedgerUseCase::new(Arc::new(repo.clone()), Arc::new(AccountConfig::default()));
        let entries = use_case.execute(user_id, None).await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].transaction_type, CoinTransactionType::WithdrawRequest);
        let sum: i64 = entries.iter().map(|e| e.amount).sum();
        assert_eq!(sum, repo.users.lock().unwrap()[&user_id].coin_balance);
        assert_eq!(sum, 200);
    }
}

#[cfg(test)]
mod profile_tests {
    use std::sync::Arc;

    use kernel::id::UserId;

    use super::support::InMemoryUsers;
    use crate::application::profile::{UpdateProfileInput, UpdateProfileUseCase};
    use crate::error::AccountError;

    fn rename(user_name: &str) -> UpdateProfileInput {
        UpdateProfileInput {
            user_name: user_name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_rename_updates_user() {
        let repo = InMemoryUsers::default();
        let user_id = repo.add("rani", 0, false);
        let use_case = UpdateProfileUseCase::new(Arc::new(repo.clone()));

        let user = use_case.execute(user_id, rename("  Rani_K ")).await.unwrap();

        assert_eq!(user.user_name, "Rani_K");
        assert_eq!(repo.users.lock().unwrap()[&user_id].user_name, "Rani_K");
    }

    #[tokio::test]
    async fn test_keeping_own_name_is_allowed() {
        let repo = InMemoryUsers::default();
        let user_id = repo.add("rani", 0, false);
        let use_case = UpdateProfileUseCase::new(Arc::new(repo));

        let user = use_case.execute(user_id, rename("RANI")).await.unwrap();
        assert_eq!(user.user_name, "RANI");
    }

    #[tokio::test]
    async fn test_name_taken_by_other_user_is_conflict() {
        let repo = InMemoryUsers::default();
        repo.add("budi", 0, false);
        let user_id = repo.add("rani", 0, false);
        let use_case = UpdateProfileUseCase::new(Arc::new(repo.clone()));

        let err = use_case.execute(user_id, rename("Budi")).await.unwrap_err();

        assert!(matches!(err, AccountError::UserNameTaken));
        assert_eq!(err.status_code(), 409);
        assert_eq!(repo.users.lock().unwrap()[&user_id].user_name, "rani");
    }

    #[tokio::test]
    async fn test_invalid_name_is_bad_request() {
        let repo = InMemoryUsers::default();
        let user_id = repo.add("rani", 0, false);
        let use_case = UpdateProfileUseCase::new(Arc::new(repo));

        let err = use_case.execute(user_id, rename("a b")).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidUserName(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let use_case = UpdateProfileUseCase::new(Arc::new(InMemoryUsers::default()));
        let err = use_case.execute(UserId::new(), rename("ghost")).await.unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound));
    }
}

#[cfg(test)]
mod middleware_tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::support::InMemoryUsers;
    use crate::application::config::AccountConfig;
    use crate::presentation::middleware::{AccountMiddlewareState, require_admin, require_user};
    use crate::presentation::router::{account_admin_router_generic, account_router_generic};

    fn cookie_for(config: &AccountConfig, user_id: kernel::id::UserId) -> String {
        let expires = chrono::Utc::now().timestamp_millis() + 60_000;
        let token = platform::token::sign(*user_id.as_uuid(), expires, &config.session_secret);
        format!("{}={}", config.session_cookie_name, token)
    }

    fn app(repo: InMemoryUsers, config: Arc<AccountConfig>) -> axum::Router {
        let state = AccountMiddlewareState {
            repo: Arc::new(repo.clone()),
            config: config.clone(),
        };
        let admin = account_admin_router_generic(repo.clone(), config.clone())
            .layer(axum::middleware::from_fn(require_admin));
        axum::Router::new()
            .nest("/account", account_router_generic(repo, config))
            .nest("/admin", admin)
            .layer(axum::middleware::from_fn_with_state(
                state,
                require_user::<InMemoryUsers>,
            ))
    }

    #[tokio::test]
    async fn test_me_without_session_is_401() {
        let config = Arc::new(AccountConfig::with_random_secret());
        let response = app(InMemoryUsers::default(), config)
            .oneshot(Request::get("/account/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_with_session_is_200() {
        let config = Arc::new(AccountConfig::with_random_secret());
        let repo = InMemoryUsers::default();
        let user_id = repo.add("rani", 10, false);

        let response = app(repo, config.clone())
            .oneshot(
                Request::get("/account/me")
                    .header(header::COOKIE, cookie_for(&config, user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_patch_me_with_taken_name_is_409() {
        let config = Arc::new(AccountConfig::with_random_secret());
        let repo = InMemoryUsers::default();
        repo.add("budi", 0, false);
        let user_id = repo.add("rani", 0, false);

        let response = app(repo.clone(), config.clone())
            .oneshot(
                Request::patch("/account/me")
                    .header(header::COOKIE, cookie_for(&config, user_id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"userName":"budi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(repo.users.lock().unwrap()[&user_id].user_name, "rani");
    }

    #[tokio::test]
    async fn test_admin_route_rejects_regular_user() {
        let config = Arc::new(AccountConfig::with_random_secret());
        let repo = InMemoryUsers::default();
        let user_id = repo.add("rani", 0, false);
        let target = repo.add("other", 0, false);

        let response = app(repo.clone(), config.clone())
            .oneshot(
                Request::post(format!("/admin/users/{target}/ban"))
                    .header(header::COOKIE, cookie_for(&config, user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!repo.users.lock().unwrap()[&target].is_banned);
    }

    #[tokio::test]
    async fn test_admin_can_ban() {
        let config = Arc::new(AccountConfig::with_random_secret());
        let repo = InMemoryUsers::default();
        let admin_id = repo.add("admin", 0, true);
        let target = repo.add("troll", 0, false);

        let response = app(repo.clone(), config.clone())
            .oneshot(
                Request::post(format!("/admin/users/{target}/ban"))
                    .header(header::COOKIE, cookie_for(&config, admin_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(repo.users.lock().unwrap()[&target].is_banned);
    }
}
