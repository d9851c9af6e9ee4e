//! Repository Traits

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ItemId, ReportId, SubCategoryId, UserId};

use crate::domain::entity::category::{Category, SubCategory};
use crate::domain::entity::claim::ItemClaim;
use crate::domain::entity::comment::Comment;
use crate::domain::entity::item::{ItemStatus, LostItem, Posting, Transition};
use crate::domain::entity::report::{ItemReport, ReportReason, ReportStatus};
use crate::error::ItemResult;

/// Listing filter for browse pages
///
/// `query` matches title or description and `location` matches the
/// location, both as case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    pub status: Option<ItemStatus>,
    pub highlighted_only: bool,
    pub query: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubCategoryId>,
    pub limit: i64,
}

#[trait_variant::make(ItemRepository: Send)]
pub trait LocalItemRepository {
    /// Insert a new post and apply `postings` (bounty escrow) in one
    /// transaction.
    async fn create(&self, item: &LostItem, postings: &[Posting]) -> ItemResult<()>;

    async fn find(&self, item_id: ItemId) -> ItemResult<Option<LostItem>>;

    /// Highlighted first, then newest
    async fn browse(&self, filter: BrowseFilter) -> ItemResult<Vec<LostItem>>;

    /// Load the item under a row lock, run `f`, persist the mutated item and
    /// apply the returned postings, all in one transaction. Nothing is
    /// written when `f` or any posting fails.
    async fn transition<T, F>(&self, item_id: ItemId, f: F) -> ItemResult<T>
    where
        T: Send,
        F: FnOnce(&mut LostItem) -> ItemResult<Transition<T>> + Send;

    /// Delete the item with its claims, comments, reports and notifications,
    /// applying the postings `f` returns in the same transaction.
    async fn remove<F>(&self, item_id: ItemId, f: F) -> ItemResult<LostItem>
    where
        F: FnOnce(&LostItem) -> ItemResult<Vec<Posting>> + Send;

    /// Clear every highlight whose expiry is at or before `now`.
    async fn expire_highlights(&self, now: DateTime<Utc>) -> ItemResult<u64>;

    /// Returns `false` if the user had already claimed the item
    async fn add_claim(&self, item_id: ItemId, user_id: UserId) -> ItemResult<bool>;

    async fn list_claims(&self, item_id: ItemId) -> ItemResult<Vec<ItemClaim>>;

    async fn add_comment(&self, item_id: ItemId, user_id: UserId, content: &str) -> ItemResult<Comment>;

    /// Oldest first
    async fn list_comments(&self, item_id: ItemId) -> ItemResult<Vec<Comment>>;
}

#[trait_variant::make(CategoryRepository: Send)]
pub trait LocalCategoryRepository {
    /// Every category with its subcategories, in display order
    async fn list_categories(&self) -> ItemResult<Vec<Category>>;

    async fn find_category(&self, category_id: CategoryId) -> ItemResult<Option<Category>>;

    async fn find_subcategory(&self, subcategory_id: SubCategoryId) -> ItemResult<Option<SubCategory>>;
}

/// Report about to be stored
#[derive(Debug, Clone)]
pub struct NewReport {
    pub id: ReportId,
    pub item_id: ItemId,
    pub reporter_id: UserId,
    pub reason: ReportReason,
    pub description: String,
}

#[trait_variant::make(ReportRepository: Send)]
pub trait LocalReportRepository {
    /// Fails with `AlreadyReported` when the reporter already reported
    /// this item
    async fn create_report(&self, report: &NewReport) -> ItemResult<()>;

    async fn has_reported(&self, item_id: ItemId, reporter_id: UserId) -> ItemResult<bool>;

    /// Newest first
    async fn list_reports(&self, status: Option<ReportStatus>, limit: i64) -> ItemResult<Vec<ItemReport>>;

    /// Returns the updated report, or `None` if it does not exist
    async fn set_report_status(&self, report_id: ReportId, status: ReportStatus) -> ItemResult<Option<ItemReport>>;
}

/// Read-only view of users needed by item rules
#[trait_variant::make(MemberDirectory: Send)]
pub trait LocalMemberDirectory {
    async fn user_exists(&self, user_id: UserId) -> ItemResult<bool>;

    async fn admin_ids(&self) -> ItemResult<Vec<UserId>>;
}
