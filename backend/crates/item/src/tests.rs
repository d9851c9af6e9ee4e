//! Unit tests for the item crate
//!
//! Use cases run against an in-memory store that applies postings with the
//! same `apply_delta` rule as the PostgreSQL ledger and rolls back on error.

#[cfg(test)]
pub(crate) mod support {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use account::{CoinTransactionType, CurrentUser, apply_delta};
    use chrono::{DateTime, Utc};
    use kernel::id::{CategoryId, ClaimId, CommentId, ItemId, ReportId, SubCategoryId, UserId};
    use notification::{NewNotification, NotificationResult, NotificationSink};

    use crate::domain::entity::category::{Category, SubCategory};
    use crate::domain::entity::claim::ItemClaim;
    use crate::domain::entity::comment::Comment;
    use crate::domain::entity::item::{LostItem, Posting, Transition};
    use crate::domain::entity::report::{ItemReport, ReportStatus};
    use crate::domain::repository::{
        BrowseFilter, CategoryRepository, ItemRepository, MemberDirectory, NewReport,
        ReportRepository,
    };
    use crate::error::{ItemError, ItemResult};

    #[derive(Default)]
    pub struct Store {
        pub users: HashMap<UserId, CurrentUser>,
        pub balances: HashMap<UserId, i64>,
        pub ledger: Vec<(UserId, i64, CoinTransactionType)>,
        pub items: HashMap<ItemId, LostItem>,
        pub claims: Vec<ItemClaim>,
        pub comments: Vec<Comment>,
        pub reports: Vec<ItemReport>,
        pub categories: Vec<Category>,
    }

    impl Store {
        /// All-or-nothing, like one database transaction
        fn post(&mut self, postings: &[Posting]) -> ItemResult<()> {
            let mut balances = self.balances.clone();
            for posting in postings {
                let balance = balances.get(&posting.user_id).copied().unwrap_or(0);
                balances.insert(posting.user_id, apply_delta(balance, posting.delta)?);
            }
            self.balances = balances;
            self.ledger.extend(
                postings
                    .iter()
                    .map(|p| (p.user_id, p.delta, p.transaction_type)),
            );
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    pub struct InMemoryItems {
        pub store: Arc<Mutex<Store>>,
    }

    impl InMemoryItems {
        pub fn add_user(&self, name: &str, balance: i64, is_admin: bool) -> CurrentUser {
            let user = CurrentUser {
                id: UserId::new(),
                user_name: name.to_string(),
                is_admin,
            };
            let mut store = self.store.lock().unwrap();
            store.users.insert(user.id, user.clone());
            store.balances.insert(user.id, balance);
            user
        }

        /// Adds a category with the named subcategories
        pub fn add_category(&self, name: &str, subcategories: &[&str]) -> Category {
            let id = CategoryId::new();
            let category = Category {
                id,
                name: name.to_string(),
                icon: "folder".to_string(),
                subcategories: subcategories
                    .iter()
                    .map(|sub| SubCategory {
                        id: SubCategoryId::new(),
                        category_id: id,
                        name: sub.to_string(),
                    })
                    .collect(),
            };
            self.store.lock().unwrap().categories.push(category.clone());
            category
        }

        pub fn balance(&self, user_id: UserId) -> i64 {
            self.store.lock().unwrap().balances[&user_id]
        }

        pub fn item(&self, item_id: ItemId) -> Option<LostItem> {
            self.store.lock().unwrap().items.get(&item_id).cloned()
        }

        pub fn ledger_of(&self, user_id: UserId, kind: CoinTransactionType) -> Vec<i64> {
            self.store
                .lock()
                .unwrap()
                .ledger
                .iter()
                .filter(|(u, _, t)| *u == user_id && *t == kind)
                .map(|(_, delta, _)| *delta)
                .collect()
        }

        /// Ledger sum equals balance for every user
        pub fn assert_ledger_balanced(&self, opening: &[(UserId, i64)]) {
            let store = self.store.lock().unwrap();
            for (user_id, start) in opening {
                let sum: i64 = store
                    .ledger
                    .iter()
                    .filter(|(u, _, _)| u == user_id)
                    .map(|(_, d, _)| d)
                    .sum();
                assert_eq!(store.balances[user_id], start + sum);
            }
        }
    }

    fn contains_ci(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }

    impl CategoryRepository for InMemoryItems {
        async fn list_categories(&self) -> ItemResult<Vec<Category>> {
            Ok(self.store.lock().unwrap().categories.clone())
        }

        async fn find_category(&self, category_id: CategoryId) -> ItemResult<Option<Category>> {
            Ok(self
                .store
                .lock()
                .unwrap()
                .categories
                .iter()
                .find(|c| c.id == category_id)
                .cloned())
        }

        async fn find_subcategory(
            &self,
            subcategory_id: SubCategoryId,
        ) -> ItemResult<Option<SubCategory>> {
            Ok(self
                .store
                .lock()
                .unwrap()
                .categories
                .iter()
                .flat_map(|c| c.subcategories.iter())
                .find(|s| s.id == subcategory_id)
                .cloned())
        }
    }

    impl ItemRepository for InMemoryItems {
        async fn create(&self, item: &LostItem, postings: &[Posting]) -> ItemResult<()> {
            let mut store = self.store.lock().unwrap();
            store.post(postings)?;
            store.items.insert(item.id, item.clone());
            Ok(())
        }

        async fn find(&self, item_id: ItemId) -> ItemResult<Option<LostItem>> {
            Ok(self.item(item_id))
        }

        async fn browse(&self, filter: BrowseFilter) -> ItemResult<Vec<LostItem>> {
            let store = self.store.lock().unwrap();
            let mut items: Vec<_> = store
                .items
                .values()
                .filter(|i| filter.status.is_none_or(|s| i.status == s))
                .filter(|i| !filter.highlighted_only || i.is_highlighted)
                .filter(|i| {
                    filter.query.as_deref().is_none_or(|q| {
                        contains_ci(&i.title, q) || contains_ci(&i.description, q)
                    })
                })
                .filter(|i| {
                    filter
                        .location
                        .as_deref()
                        .is_none_or(|l| contains_ci(&i.location, l))
                })
                .filter(|i| filter.category_id.is_none_or(|c| i.category_id == Some(c)))
                .filter(|i| {
                    filter
                        .subcategory_id
                        .is_none_or(|c| i.subcategory_id == Some(c))
                })
                .cloned()
                .collect();
            items.sort_by(|a, b| {
                b.is_highlighted
                    .cmp(&a.is_highlighted)
                    .then(b.created_at.cmp(&a.created_at))
            });
            items.truncate(filter.limit as usize);
            Ok(items)
        }

        async fn transition<T, F>(&self, item_id: ItemId, f: F) -> ItemResult<T>
        where
            T: Send,
            F: FnOnce(&mut LostItem) -> ItemResult<Transition<T>> + Send,
        {
            let mut store = self.store.lock().unwrap();
            let mut item = store
                .items
                .get(&item_id)
                .cloned()
                .ok_or(ItemError::ItemNotFound)?;
            let transition = f(&mut item)?;
            store.post(&transition.postings)?;
            store.items.insert(item_id, item);
            Ok(transition.value)
        }

        async fn remove<F>(&self, item_id: ItemId, f: F) -> ItemResult<LostItem>
        where
            F: FnOnce(&LostItem) -> ItemResult<Vec<Posting>> + Send,
        {
            let mut store = self.store.lock().unwrap();
            let item = store
                .items
                .get(&item_id)
                .cloned()
                .ok_or(ItemError::ItemNotFound)?;
            let postings = f(&item)?;
            store.post(&postings)?;
            store.items.remove(&item_id);
            store.claims.retain(|c| c.item_id != item_id);
            store.comments.retain(|c| c.item_id != item_id);
            store.reports.retain(|r| r.item_id != item_id);
            Ok(item)
        }

        async fn expire_highlights(&self, now: DateTime<Utc>) -> ItemResult<u64> {
            let mut store = self.store.lock().unwrap();
            Ok(store
                .items
                .values_mut()
                .map(|i| i.expire_highlight(now))
                .filter(|expired| *expired)
                .count() as u64)
        }

        async fn add_claim(&self, item_id: ItemId, user_id: UserId) -> ItemResult<bool> {
            let mut store = self.store.lock().unwrap();
            if store
                .claims
                .iter()
                .any(|c| c.item_id == item_id && c.user_id == user_id)
            {
                return Ok(false);
            }
            let user_name = store.users[&user_id].user_name.clone();
            store.claims.push(ItemClaim {
                id: ClaimId::new(),
                item_id,
                user_id,
                user_name,
                created_at: Utc::now(),
            });
            Ok(true)
        }

        async fn list_claims(&self, item_id: ItemId) -> ItemResult<Vec<ItemClaim>> {
            let store = self.store.lock().unwrap();
            Ok(store
                .claims
                .iter()
                .filter(|c| c.item_id == item_id)
                .cloned()
                .collect())
        }

        async fn add_comment(&self, item_id: ItemId, user_id: UserId, content: &str) -> ItemResult<Comment> {
            let mut store = self.store.lock().unwrap();
            let comment = Comment {
                id: CommentId::new(),
                item_id,
                user_id,
                user_name: store.users[&user_id].user_name.clone(),
                content: content.to_string(),
                created_at: Utc::now(),
            };
            store.comments.push(comment.clone());
            Ok(comment)
        }

        async fn list_comments(&self, item_id: ItemId) -> ItemResult<Vec<Comment>> {
            let store = self.store.lock().unwrap();
            Ok(store
                .comments
                .iter()
                .filter(|c| c.item_id == item_id)
                .cloned()
                .collect())
        }
    }

    impl ReportRepository for InMemoryItems {
        async fn create_report(&self, report: &NewReport) -> ItemResult<()> {
            let mut store = self.store.lock().unwrap();
            if store
                .reports
                .iter()
                .any(|r| r.item_id == report.item_id && r.reporter_id == report.reporter_id)
            {
                return Err(ItemError::AlreadyReported);
            }
            let item = store.items[&report.item_id].clone();
            let now = Utc::now();
            store.reports.push(ItemReport {
                id: report.id,
                item_id: report.item_id,
                item_title: item.title,
                item_owner_id: item.owner_id,
                reporter_id: report.reporter_id,
                reason: report.reason,
                description: report.description.clone(),
                status: ReportStatus::Pending,
                created_at: now,
                updated_at: now,
            });
            Ok(())
        }

        async fn has_reported(&self, item_id: ItemId, reporter_id: UserId) -> ItemResult<bool> {
            Ok(self
                .store
                .lock()
                .unwrap()
                .reports
                .iter()
                .any(|r| r.item_id == item_id && r.reporter_id == reporter_id))
        }

        async fn list_reports(&self, status: Option<ReportStatus>, limit: i64) -> ItemResult<Vec<ItemReport>> {
            let store = self.store.lock().unwrap();
            Ok(store
                .reports
                .iter()
                .rev()
                .filter(|r| status.is_none_or(|s| r.status == s))
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn set_report_status(&self, report_id: ReportId, status: ReportStatus) -> ItemResult<Option<ItemReport>> {
            let mut store = self.store.lock().unwrap();
            Ok(store
                .reports
                .iter_mut()
                .find(|r| r.id == report_id)
                .map(|r| {
                    r.status = status;
                    r.updated_at = Utc::now();
                    r.clone()
                }))
        }
    }

    impl MemberDirectory for InMemoryItems {
        async fn user_exists(&self, user_id: UserId) -> ItemResult<bool> {
            Ok(self.store.lock().unwrap().users.contains_key(&user_id))
        }

        async fn admin_ids(&self) -> ItemResult<Vec<UserId>> {
            Ok(self
                .store
                .lock()
                .unwrap()
                .users
                .values()
                .filter(|u| u.is_admin)
                .map(|u| u.id)
                .collect())
        }
    }

    /// Keeps every notification it is handed
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub sent: Arc<Mutex<Vec<NewNotification>>>,
    }

    impl RecordingSink {
        pub fn sent_to(&self, user_id: UserId) -> Vec<NewNotification> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.user_id == user_id)
                .cloned()
                .collect()
        }
    }

    impl NotificationSink for RecordingSink {
        async fn notify(&self, n: NewNotification) -> NotificationResult<()> {
            self.sent.lock().unwrap().push(n);
            Ok(())
        }
    }
}

#[cfg(test)]
mod return_flow_tests {
    use std::sync::Arc;

    use account::{CoinTransactionType, CurrentUser};
    use kernel::id::{ItemId, UserId};
    use notification::NotificationKind;

    use super::support::{InMemoryItems, RecordingSink};
    use crate::application::config::ItemConfig;
    use crate::application::manage_item::{CreateItemInput, CreateItemUseCase};
    use crate::application::return_flow::{
        ClaimItemUseCase, ConfirmReturnUseCase, ListClaimsUseCase, SelectFinderUseCase,
    };
    use crate::domain::entity::item::ItemStatus;
    use crate::error::ItemError;

    async fn post_item(repo: &InMemoryItems, owner: &CurrentUser, bounty: i64) -> ItemId {
        let use_case = CreateItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()));
        use_case
            .execute(
                owner.id,
                CreateItemInput {
                    title: "Blue umbrella".into(),
                    description: "Left near the library".into(),
                    location: "Perpustakaan Pusat".into(),
                    subcategory_id: None,
                    bounty_coins: bounty,
                },
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_owner_confirming_twice_pays_bounty_once() {
        let repo = InMemoryItems::default();
        let sink = RecordingSink::default();
        let owner = repo.add_user("owner", 100, false);
        let finder = repo.add_user("finder", 0, false);

        let item_id = post_item(&repo, &owner, 100).await;
        assert_eq!(repo.balance(owner.id), 0);

        SelectFinderUseCase::new(Arc::new(repo.clone()))
            .execute(item_id, owner.id, finder.id)
            .await
            .unwrap();

        let confirm = ConfirmReturnUseCase::new(Arc::new(repo.clone()), Arc::new(sink.clone()));
        let first = confirm.execute(item_id, owner.id).await.unwrap();
        let second = confirm.execute(item_id, owner.id).await.unwrap();

        assert!(first.settled);
        assert_eq!(first.payout, Some((finder.id, 100)));
        assert!(!second.settled);
        assert_eq!(second.payout, None);

        assert_eq!(repo.balance(finder.id), 100);
        assert_eq!(
            repo.ledger_of(finder.id, CoinTransactionType::BountyPayout),
            vec![100]
        );
        let item = repo.item(item_id).unwrap();
        assert_eq!(item.status, ItemStatus::Found);
        assert!(item.owner_confirmed && item.finder_confirmed);

        let notes = sink.sent_to(finder.id);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Bounty);
        assert_eq!(notes[0].related_item_id, Some(item_id));

        repo.assert_ledger_balanced(&[(owner.id, 100), (finder.id, 0)]);
    }

    #[tokio::test]
    async fn test_finder_then_owner_confirmation_settles() {
        let repo = InMemoryItems::default();
        let sink = RecordingSink::default();
        let owner = repo.add_user("owner", 40, false);
        let finder = repo.add_user("finder", 0, false);
        let item_id = post_item(&repo, &owner, 40).await;

        SelectFinderUseCase::new(Arc::new(repo.clone()))
            .execute(item_id, owner.id, finder.id)
            .await
            .unwrap();
        let confirm = ConfirmReturnUseCase::new(Arc::new(repo.clone()), Arc::new(sink.clone()));

        let by_finder = confirm.execute(item_id, finder.id).await.unwrap();
        assert!(!by_finder.settled);
        assert_eq!(repo.balance(finder.id), 0);
        assert!(sink.sent_to(finder.id).is_empty());

        let by_owner = confirm.execute(item_id, owner.id).await.unwrap();
        assert!(by_owner.settled);
        assert_eq!(repo.balance(finder.id), 40);
    }

    #[tokio::test]
    async fn test_non_owner_select_finder_changes_nothing() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 0, false);
        let stranger = repo.add_user("stranger", 0, false);
        let item_id = post_item(&repo, &owner, 0).await;
        let before = repo.item(item_id).unwrap();

        let err = SelectFinderUseCase::new(Arc::new(repo.clone()))
            .execute(item_id, stranger.id, stranger.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::Unauthorized));

        let after = repo.item(item_id).unwrap();
        assert_eq!(after.finder_id, before.finder_id);
        assert_eq!(after.owner_confirmed, before.owner_confirmed);
        assert_eq!(after.finder_confirmed, before.finder_confirmed);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_select_unknown_candidate_is_not_found() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 0, false);
        let item_id = post_item(&repo, &owner, 0).await;

        let err = SelectFinderUseCase::new(Arc::new(repo.clone()))
            .execute(item_id, owner.id, UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::CandidateNotFound));
        assert_eq!(repo.item(item_id).unwrap().finder_id, None);
    }

    #[tokio::test]
    async fn test_confirm_on_missing_item() {
        let repo = InMemoryItems::default();
        let user = repo.add_user("someone", 0, false);
        let confirm =
            ConfirmReturnUseCase::new(Arc::new(repo.clone()), Arc::new(RecordingSink::default()));
        assert!(matches!(
            confirm.execute(ItemId::new(), user.id).await,
            Err(ItemError::ItemNotFound)
        ));
    }

    #[tokio::test]
    async fn test_claims_are_idempotent_and_owner_only() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 0, false);
        let finder = repo.add_user("finder", 0, false);
        let item_id = post_item(&repo, &owner, 0).await;

        let claim = ClaimItemUseCase::new(Arc::new(repo.clone()));
        assert!(claim.execute(item_id, finder.id).await.unwrap());
        assert!(!claim.execute(item_id, finder.id).await.unwrap());

        let list = ListClaimsUseCase::new(Arc::new(repo.clone()));
        let claims = list.execute(item_id, owner.id).await.unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].user_name, "finder");

        assert!(matches!(
            list.execute(item_id, finder.id).await,
            Err(ItemError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_claim_on_found_item_is_ignored() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 0, false);
        let finder = repo.add_user("finder", 0, false);
        let late = repo.add_user("late", 0, false);
        let item_id = post_item(&repo, &owner, 0).await;

        SelectFinderUseCase::new(Arc::new(repo.clone()))
            .execute(item_id, owner.id, finder.id)
            .await
            .unwrap();
        ConfirmReturnUseCase::new(Arc::new(repo.clone()), Arc::new(RecordingSink::default()))
            .execute(item_id, owner.id)
            .await
            .unwrap();

        let claim = ClaimItemUseCase::new(Arc::new(repo.clone()));
        assert!(!claim.execute(item_id, late.id).await.unwrap());
    }
}

#[cfg(test)]
mod manage_item_tests {
    use std::sync::Arc;

    use account::CoinTransactionType;
    use chrono::{Duration, Utc};
    use notification::NotificationKind;

    use super::support::{InMemoryItems, RecordingSink};
    use crate::application::browse::{BrowseItemsUseCase, ItemSearch};
    use crate::application::comments::CommentUseCase;
    use crate::application::config::ItemConfig;
    use crate::application::manage_item::{
        CreateItemInput, CreateItemUseCase, DeleteItemUseCase, EditItemInput, EditItemUseCase,
        HighlightItemUseCase,
    };
    use crate::application::sweep::ExpireHighlightsUseCase;
    use crate::domain::entity::item::ItemStatus;
    use crate::error::ItemError;

    fn input(title: &str, bounty: i64) -> CreateItemInput {
        CreateItemInput {
            title: title.into(),
            description: String::new(),
            location: "Gedung Rektorat".into(),
            subcategory_id: None,
            bounty_coins: bounty,
        }
    }

    fn create(repo: &InMemoryItems) -> CreateItemUseCase<InMemoryItems> {
        CreateItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()))
    }

    #[tokio::test]
    async fn test_create_escrows_bounty() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 150, false);

        let item = create(&repo).execute(owner.id, input("Keys", 100)).await.unwrap();
        assert_eq!(item.status, ItemStatus::Lost);
        assert_eq!(repo.balance(owner.id), 50);
        assert_eq!(
            repo.ledger_of(owner.id, CoinTransactionType::BountyEscrow),
            vec![-100]
        );
    }

    #[tokio::test]
    async fn test_create_without_funds_stores_nothing() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 30, false);

        let err = create(&repo).execute(owner.id, input("Keys", 100)).await.unwrap_err();
        assert!(matches!(
            err,
            ItemError::InsufficientBalance {
                balance: 30,
                required: 100
            }
        ));
        assert_eq!(repo.balance(owner.id), 30);
        assert!(repo.store.lock().unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 0, false);

        assert!(matches!(
            create(&repo).execute(owner.id, input("Keys", -1)).await,
            Err(ItemError::InvalidInput(_))
        ));
        assert!(matches!(
            create(&repo).execute(owner.id, input("   ", 0)).await,
            Err(ItemError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_owner_delete_refunds_unsettled_bounty() {
        let repo = InMemoryItems::default();
        let sink = RecordingSink::default();
        let owner = repo.add_user("owner", 100, false);
        let item = create(&repo).execute(owner.id, input("Laptop", 80)).await.unwrap();

        DeleteItemUseCase::new(Arc::new(repo.clone()), Arc::new(sink.clone()))
            .execute(item.id, owner.id, false)
            .await
            .unwrap();

        assert!(repo.item(item.id).is_none());
        assert_eq!(repo.balance(owner.id), 100);
        assert_eq!(
            repo.ledger_of(owner.id, CoinTransactionType::BountyRefund),
            vec![80]
        );
        let notes = sink.sent_to(owner.id);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].reference_url.as_deref(), Some("/wallet"));
        repo.assert_ledger_balanced(&[(owner.id, 100)]);
    }

    #[tokio::test]
    async fn test_delete_requires_owner_unless_admin() {
        let repo = InMemoryItems::default();
        let sink = RecordingSink::default();
        let owner = repo.add_user("owner", 0, false);
        let admin = repo.add_user("admin", 0, true);
        let item = create(&repo).execute(owner.id, input("Jacket", 0)).await.unwrap();

        let delete = DeleteItemUseCase::new(Arc::new(repo.clone()), Arc::new(sink.clone()));
        // admin powers only apply through the admin route
        assert!(matches!(
            delete.execute(item.id, admin.id, false).await,
            Err(ItemError::Unauthorized)
        ));
        assert!(repo.item(item.id).is_some());

        delete.execute(item.id, admin.id, true).await.unwrap();
        assert!(repo.item(item.id).is_none());

        let notes = sink.sent_to(owner.id);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Warning);
    }

    #[tokio::test]
    async fn test_edit_is_owner_only() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 0, false);
        let other = repo.add_user("other", 0, false);
        let item = create(&repo).execute(owner.id, input("Phone", 0)).await.unwrap();

        let edit = EditItemUseCase::new(Arc::new(repo.clone()));
        let changes = EditItemInput {
            title: "Black phone".into(),
            description: "Cracked screen".into(),
            location: "Kantin".into(),
            subcategory_id: None,
        };

        assert!(matches!(
            edit.execute(item.id, other.id, changes.clone()).await,
            Err(ItemError::Unauthorized)
        ));
        let edited = edit.execute(item.id, owner.id, changes).await.unwrap();
        assert_eq!(edited.title, "Black phone");
        assert_eq!(repo.item(item.id).unwrap().location, "Kantin");
    }

    #[tokio::test]
    async fn test_highlight_charges_owner_and_rolls_back_without_funds() {
        let repo = InMemoryItems::default();
        let rich = repo.add_user("rich", 60, false);
        let poor = repo.add_user("poor", 10, false);
        let config = Arc::new(ItemConfig::default());

        let rich_item = create(&repo).execute(rich.id, input("Bag", 0)).await.unwrap();
        let poor_item = create(&repo).execute(poor.id, input("Cap", 0)).await.unwrap();
        let highlight = HighlightItemUseCase::new(Arc::new(repo.clone()), config);

        let expiry = highlight.execute(rich_item.id, rich.id).await.unwrap();
        assert!(expiry > Utc::now() + Duration::hours(23));
        assert_eq!(repo.balance(rich.id), 10);
        assert!(repo.item(rich_item.id).unwrap().is_highlighted);

        assert!(matches!(
            highlight.execute(poor_item.id, poor.id).await,
            Err(ItemError::InsufficientBalance { .. })
        ));
        assert_eq!(repo.balance(poor.id), 10);
        assert!(!repo.item(poor_item.id).unwrap().is_highlighted);
    }

    #[tokio::test]
    async fn test_browse_puts_highlights_first_and_drops_lapsed_ones() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 500, false);
        let config = Arc::new(ItemConfig::default());

        let pinned = create(&repo).execute(owner.id, input("Pinned", 0)).await.unwrap();
        let lapsed = create(&repo).execute(owner.id, input("Lapsed", 0)).await.unwrap();
        create(&repo).execute(owner.id, input("Plain", 0)).await.unwrap();

        let highlight = HighlightItemUseCase::new(Arc::new(repo.clone()), config.clone());
        highlight.execute(pinned.id, owner.id).await.unwrap();
        highlight.execute(lapsed.id, owner.id).await.unwrap();
        repo.store
            .lock()
            .unwrap()
            .items
            .get_mut(&lapsed.id)
            .unwrap()
            .highlight_expiry = Some(Utc::now() - Duration::minutes(1));

        let browse = BrowseItemsUseCase::new(Arc::new(repo.clone()), config);
        let items = browse.browse(ItemSearch::default()).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, pinned.id);
        assert!(!repo.item(lapsed.id).unwrap().is_highlighted);

        let highlights = browse.highlights(None, None).await.unwrap();
        assert_eq!(highlights.len(), 1);

        let found = browse
            .browse(ItemSearch {
                status: Some(ItemStatus::Found),
                ..ItemSearch::default()
            })
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_counts_expired_highlights() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 100, false);
        let item = create(&repo).execute(owner.id, input("Watch", 0)).await.unwrap();
        HighlightItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()))
            .execute(item.id, owner.id)
            .await
            .unwrap();

        let sweep = ExpireHighlightsUseCase::new(Arc::new(repo.clone()));
        assert_eq!(sweep.execute(Utc::now()).await.unwrap(), 0);
        assert_eq!(sweep.execute(Utc::now() + Duration::hours(25)).await.unwrap(), 1);
        assert_eq!(sweep.execute(Utc::now() + Duration::hours(26)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_comments() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 0, false);
        let helper = repo.add_user("helper", 0, false);
        let item = create(&repo).execute(owner.id, input("Wallet", 0)).await.unwrap();

        let comments = CommentUseCase::new(Arc::new(repo.clone()));
        assert!(matches!(
            comments.post(item.id, helper.id, "   ").await,
            Err(ItemError::InvalidInput(_))
        ));

        let posted = comments.post(item.id, helper.id, " Saw it at the canteen ").await.unwrap();
        assert_eq!(posted.content, "Saw it at the canteen");
        assert_eq!(posted.user_name, "helper");
        assert_eq!(comments.list(item.id).await.unwrap().len(), 1);
    }
}

#[cfg(test)]
mod browse_tests {
    use std::sync::Arc;

    use kernel::id::{CategoryId, SubCategoryId};

    use super::support::InMemoryItems;
    use crate::application::browse::{BrowseItemsUseCase, ItemSearch};
    use crate::application::categories::CategoryUseCase;
    use crate::application::config::ItemConfig;
    use crate::application::manage_item::{
        CreateItemInput, CreateItemUseCase, EditItemInput, EditItemUseCase, HighlightItemUseCase,
    };
    use crate::domain::entity::item::LostItem;
    use crate::error::ItemError;

    async fn post(
        repo: &InMemoryItems,
        title: &str,
        description: &str,
        location: &str,
        subcategory_id: Option<SubCategoryId>,
    ) -> LostItem {
        let owner = repo.add_user("owner", 100, false);
        CreateItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()))
            .execute(
                owner.id,
                CreateItemInput {
                    title: title.into(),
                    description: description.into(),
                    location: location.into(),
                    subcategory_id,
                    bounty_coins: 0,
                },
            )
            .await
            .unwrap()
    }

    fn browse(repo: &InMemoryItems) -> BrowseItemsUseCase<InMemoryItems> {
        BrowseItemsUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()))
    }

    fn titles(items: &[LostItem]) -> Vec<&str> {
        let mut titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        titles.sort();
        titles
    }

    #[tokio::test]
    async fn test_query_matches_title_or_description_ignoring_case() {
        let repo = InMemoryItems::default();
        post(&repo, "Black Wallet", "", "Kantin FT", None).await;
        post(&repo, "Keys", "Attached to a wallet chain", "Lab 3", None).await;
        post(&repo, "Umbrella", "Blue", "Perpustakaan", None).await;

        let items = browse(&repo)
            .browse(ItemSearch {
                query: Some("WALLET".into()),
                ..ItemSearch::default()
            })
            .await
            .unwrap();

        assert_eq!(titles(&items), vec!["Black Wallet", "Keys"]);
    }

    #[tokio::test]
    async fn test_location_filter_combines_with_query() {
        let repo = InMemoryItems::default();
        post(&repo, "Black Wallet", "", "Kantin FT", None).await;
        post(&repo, "Brown Wallet", "", "Masjid Kampus", None).await;
        post(&repo, "Keys", "", "Kantin FT", None).await;

        let items = browse(&repo)
            .browse(ItemSearch {
                query: Some("wallet".into()),
                location: Some("kantin".into()),
                ..ItemSearch::default()
            })
            .await
            .unwrap();

        assert_eq!(titles(&items), vec!["Black Wallet"]);
    }

    #[tokio::test]
    async fn test_blank_text_filters_are_ignored() {
        let repo = InMemoryItems::default();
        post(&repo, "Black Wallet", "", "Kantin FT", None).await;
        post(&repo, "Keys", "", "Lab 3", None).await;

        let items = browse(&repo)
            .browse(ItemSearch {
                query: Some("   ".into()),
                location: Some(String::new()),
                ..ItemSearch::default()
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_create_files_item_under_parent_category() {
        let repo = InMemoryItems::default();
        let electronics = repo.add_category("Elektronik", &["Handphone", "Laptop"]);
        let laptop = electronics.subcategories[1].id;

        let item = post(&repo, "ThinkPad", "", "Lab 3", Some(laptop)).await;

        assert_eq!(item.category_id, Some(electronics.id));
        assert_eq!(item.subcategory_id, Some(laptop));
    }

    #[tokio::test]
    async fn test_create_with_unknown_subcategory_stores_nothing() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 100, false);

        let err = CreateItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()))
            .execute(
                owner.id,
                CreateItemInput {
                    title: "Keys".into(),
                    description: String::new(),
                    location: "Lab 3".into(),
                    subcategory_id: Some(SubCategoryId::new()),
                    bounty_coins: 50,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::InvalidInput(_)));
        assert_eq!(repo.balance(owner.id), 100);
        assert!(repo.store.lock().unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_category_and_subcategory_filters() {
        let repo = InMemoryItems::default();
        let electronics = repo.add_category("Elektronik", &["Handphone", "Laptop"]);
        let documents = repo.add_category("Dokumen", &["SIM"]);
        let phone = electronics.subcategories[0].id;
        let laptop = electronics.subcategories[1].id;

        post(&repo, "iPhone", "", "Kantin", Some(phone)).await;
        post(&repo, "ThinkPad", "", "Lab 3", Some(laptop)).await;
        post(&repo, "SIM A", "", "Parkiran", Some(documents.subcategories[0].id)).await;
        post(&repo, "Umbrella", "", "Perpustakaan", None).await;

        let in_category = browse(&repo)
            .browse(ItemSearch {
                category_id: Some(electronics.id),
                ..ItemSearch::default()
            })
            .await
            .unwrap();
        assert_eq!(titles(&in_category), vec!["ThinkPad", "iPhone"]);

        let in_subcategory = browse(&repo)
            .browse(ItemSearch {
                subcategory_id: Some(laptop),
                ..ItemSearch::default()
            })
            .await
            .unwrap();
        assert_eq!(titles(&in_subcategory), vec!["ThinkPad"]);
    }

    #[tokio::test]
    async fn test_unknown_category_filter_is_not_found() {
        let repo = InMemoryItems::default();

        let err = browse(&repo)
            .browse(ItemSearch {
                category_id: Some(CategoryId::new()),
                ..ItemSearch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::CategoryNotFound));

        let err = browse(&repo)
            .browse(ItemSearch {
                subcategory_id: Some(SubCategoryId::new()),
                ..ItemSearch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::SubCategoryNotFound));
    }

    #[tokio::test]
    async fn test_category_highlights_stay_within_category() {
        let repo = InMemoryItems::default();
        let keys = repo.add_category("Kunci", &["Kunci Loker"]);
        let bags = repo.add_category("Dompet & Tas", &["Tas Ransel"]);
        let owner = repo.add_user("owner", 500, false);
        let create =
            CreateItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()));
        let highlight =
            HighlightItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()));

        let mut ids = Vec::new();
        for (title, sub) in [
            ("Locker key", keys.subcategories[0].id),
            ("Backpack", bags.subcategories[0].id),
        ] {
            let item = create
                .execute(
                    owner.id,
                    CreateItemInput {
                        title: title.into(),
                        description: String::new(),
                        location: "Gedung A".into(),
                        subcategory_id: Some(sub),
                        bounty_coins: 0,
                    },
                )
                .await
                .unwrap();
            highlight.execute(item.id, owner.id).await.unwrap();
            ids.push(item.id);
        }
        post(&repo, "Spare key", "", "Gedung A", Some(keys.subcategories[0].id)).await;

        let highlighted = browse(&repo).highlights(Some(keys.id), None).await.unwrap();
        assert_eq!(highlighted.len(), 1);
        assert_eq!(highlighted[0].id, ids[0]);

        let everywhere = browse(&repo).highlights(None, None).await.unwrap();
        assert_eq!(everywhere.len(), 2);
    }

    #[tokio::test]
    async fn test_category_highlights_for_unknown_category_is_not_found() {
        let repo = InMemoryItems::default();
        let err = browse(&repo)
            .highlights(Some(CategoryId::new()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::CategoryNotFound));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_edit_moves_item_between_categories() {
        let repo = InMemoryItems::default();
        let electronics = repo.add_category("Elektronik", &["Handphone"]);
        let jewellery = repo.add_category("Perhiasan", &["Jam Tangan (Analog/Digital)"]);
        let owner = repo.add_user("owner", 0, false);

        let item = CreateItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()))
            .execute(
                owner.id,
                CreateItemInput {
                    title: "Smartwatch".into(),
                    description: String::new(),
                    location: "GOR".into(),
                    subcategory_id: Some(electronics.subcategories[0].id),
                    bounty_coins: 0,
                },
            )
            .await
            .unwrap();

        let watch = jewellery.subcategories[0].id;
        let edited = EditItemUseCase::new(Arc::new(repo.clone()))
            .execute(
                item.id,
                owner.id,
                EditItemInput {
                    title: "Smartwatch".into(),
                    description: String::new(),
                    location: "GOR".into(),
                    subcategory_id: Some(watch),
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.category_id, Some(jewellery.id));
        assert_eq!(edited.subcategory_id, Some(watch));
    }

    #[tokio::test]
    async fn test_category_lookups() {
        let repo = InMemoryItems::default();
        let keys = repo.add_category("Kunci", &["Kunci Kendaraan", "Kunci Loker"]);
        let use_case = CategoryUseCase::new(Arc::new(repo.clone()));

        assert_eq!(use_case.list().await.unwrap().len(), 1);
        assert_eq!(use_case.category(keys.id).await.unwrap().subcategories.len(), 2);
        assert_eq!(
            use_case
                .subcategory(keys.subcategories[1].id)
                .await
                .unwrap()
                .name,
            "Kunci Loker"
        );
        assert!(matches!(
            use_case.category(CategoryId::new()).await,
            Err(ItemError::CategoryNotFound)
        ));
        assert!(matches!(
            use_case.subcategory(SubCategoryId::new()).await,
            Err(ItemError::SubCategoryNotFound)
        ));
    }
}

#[cfg(test)]
mod moderation_tests {
    use std::sync::Arc;

    use account::CurrentUser;
    use kernel::id::{ItemId, ReportId};
    use notification::NotificationKind;

    use super::support::{InMemoryItems, RecordingSink};
    use crate::application::config::ItemConfig;
    use crate::application::manage_item::{CreateItemInput, CreateItemUseCase};
    use crate::application::moderation::{
        ReviewReportsUseCase, SubmitReportInput, SubmitReportUseCase,
    };
    use crate::domain::entity::report::ReportStatus;
    use crate::error::ItemError;

    async fn post_item(repo: &InMemoryItems, owner: &CurrentUser) -> ItemId {
        CreateItemUseCase::new(Arc::new(repo.clone()), Arc::new(ItemConfig::default()))
            .execute(
                owner.id,
                CreateItemInput {
                    title: "Selling cheap phones".into(),
                    description: String::new(),
                    location: "Online".into(),
                    subcategory_id: None,
                    bounty_coins: 0,
                },
            )
            .await
            .unwrap()
            .id
    }

    fn spam() -> SubmitReportInput {
        SubmitReportInput {
            reason: "buying_selling".into(),
            description: "Not a lost item".into(),
        }
    }

    #[tokio::test]
    async fn test_report_notifies_admins_once_per_reporter() {
        let repo = InMemoryItems::default();
        let sink = RecordingSink::default();
        let owner = repo.add_user("owner", 0, false);
        let reporter = repo.add_user("reporter", 0, false);
        let admin = repo.add_user("admin", 0, true);
        let item_id = post_item(&repo, &owner).await;

        let submit = SubmitReportUseCase::new(Arc::new(repo.clone()), Arc::new(sink.clone()));
        let report_id = submit.execute(item_id, &reporter, spam()).await.unwrap();

        let notes = sink.sent_to(admin.id);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Report);
        assert_eq!(notes[0].related_report_id, Some(report_id));

        assert!(matches!(
            submit.execute(item_id, &reporter, spam()).await,
            Err(ItemError::AlreadyReported)
        ));
        assert_eq!(sink.sent_to(admin.id).len(), 1);
    }

    #[tokio::test]
    async fn test_report_rejects_own_post_and_unknown_reason() {
        let repo = InMemoryItems::default();
        let owner = repo.add_user("owner", 0, false);
        let reporter = repo.add_user("reporter", 0, false);
        let item_id = post_item(&repo, &owner).await;

        let submit =
            SubmitReportUseCase::new(Arc::new(repo.clone()), Arc::new(RecordingSink::default()));
        assert!(matches!(
            submit.execute(item_id, &owner, spam()).await,
            Err(ItemError::InvalidInput(_))
        ));
        let bogus = SubmitReportInput {
            reason: "boring".into(),
            description: String::new(),
        };
        assert!(matches!(
            submit.execute(item_id, &reporter, bogus).await,
            Err(ItemError::InvalidInput(_))
        ));
        assert!(repo.store.lock().unwrap().reports.is_empty());
    }

    #[tokio::test]
    async fn test_warn_owner_marks_reviewed_and_notifies() {
        let repo = InMemoryItems::default();
        let sink = RecordingSink::default();
        let owner = repo.add_user("owner", 0, false);
        let reporter = repo.add_user("reporter", 0, false);
        let item_id = post_item(&repo, &owner).await;

        let report_id = SubmitReportUseCase::new(Arc::new(repo.clone()), Arc::new(sink.clone()))
            .execute(item_id, &reporter, spam())
            .await
            .unwrap();

        let review = ReviewReportsUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(sink.clone()),
            Arc::new(ItemConfig::default()),
        );
        let report = review.warn_owner(report_id).await.unwrap();
        assert_eq!(report.status, ReportStatus::Reviewed);

        let notes = sink.sent_to(owner.id);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Warning);

        let pending = review.list(Some(ReportStatus::Pending)).await.unwrap();
        assert!(pending.is_empty());

        let resolved = review.resolve(report_id).await.unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);
        assert!(matches!(
            review.resolve(ReportId::new()).await,
            Err(ItemError::ReportNotFound)
        ));
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use kernel::id::{CategoryId, ItemId};
    use tower::ServiceExt;

    use super::support::{InMemoryItems, RecordingSink};
    use crate::application::config::ItemConfig;
    use crate::presentation::router::item_public_router_generic;

    fn app(repo: &InMemoryItems) -> axum::Router {
        item_public_router_generic(
            repo.clone(),
            RecordingSink::default(),
            Arc::new(ItemConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_unknown_item_is_404() {
        let repo = InMemoryItems::default();
        let response = app(&repo)
            .oneshot(
                Request::builder()
                    .uri(format!("/{}", ItemId::new()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_status_filter_is_400() {
        let repo = InMemoryItems::default();
        let response = app(&repo)
            .oneshot(
                Request::builder()
                    .uri("/?status=MISSING")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_params_are_accepted() {
        let repo = InMemoryItems::default();
        let response = app(&repo)
            .oneshot(
                Request::builder()
                    .uri("/?q=dompet&location=kantin&status=lost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_category_routes() {
        let repo = InMemoryItems::default();
        let keys = repo.add_category("Kunci", &["Kunci Loker"]);

        for (uri, expected) in [
            ("/categories".to_string(), StatusCode::OK),
            (format!("/categories/{}", keys.id), StatusCode::OK),
            (format!("/categories/{}/highlights", keys.id), StatusCode::OK),
            (
                format!("/subcategories/{}", keys.subcategories[0].id),
                StatusCode::OK,
            ),
            (format!("/categories/{}", CategoryId::new()), StatusCode::NOT_FOUND),
            (
                format!("/categories/{}/highlights", CategoryId::new()),
                StatusCode::NOT_FOUND,
            ),
            (format!("/?category={}", CategoryId::new()), StatusCode::NOT_FOUND),
        ] {
            let response = app(&repo)
                .oneshot(Request::builder().uri(uri.as_str()).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_browse_is_public() {
        let repo = InMemoryItems::default();
        let response = app(&repo)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
