//! API DTOs

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ClaimId, CommentId, ItemId, ReportId, SubCategoryId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::browse::ItemSearch;
use crate::application::manage_item::{CreateItemInput, EditItemInput};
use crate::application::moderation::SubmitReportInput;
use crate::domain::entity::category::{Category, SubCategory};
use crate::domain::entity::claim::ItemClaim;
use crate::domain::entity::comment::Comment;
use crate::domain::entity::item::{ConfirmOutcome, ItemStatus, LostItem};
use crate::domain::entity::report::{ItemReport, ReportReason, ReportStatus};
use crate::error::ItemResult;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseQuery {
    /// `LOST` or `FOUND`, case-insensitive
    #[serde(default)]
    pub status: Option<String>,
    /// Matches title or description
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub subcategory: Option<SubCategoryId>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl BrowseQuery {
    pub fn into_search(self) -> ItemResult<ItemSearch> {
        Ok(ItemSearch {
            status: self.status.as_deref().map(str::parse::<ItemStatus>).transpose()?,
            query: self.q,
            location: self.location,
            category_id: self.category,
            subcategory_id: self.subcategory,
            limit: self.limit,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryResponse {
    pub subcategory_id: SubCategoryId,
    pub category_id: CategoryId,
    pub name: String,
}

impl From<SubCategory> for SubCategoryResponse {
    fn from(sub: SubCategory) -> Self {
        Self {
            subcategory_id: sub.id,
            category_id: sub.category_id,
            name: sub.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub category_id: CategoryId,
    pub name: String,
    pub icon: String,
    pub subcategories: Vec<SubCategoryResponse>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            category_id: category.id,
            name: category.name,
            icon: category.icon,
            subcategories: category.subcategories.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub subcategory_id: Option<SubCategoryId>,
    #[serde(default)]
    pub bounty_coins: i64,
}

impl From<CreateItemRequest> for CreateItemInput {
    fn from(req: CreateItemRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location: req.location,
            subcategory_id: req.subcategory_id,
            bounty_coins: req.bounty_coins,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub subcategory_id: Option<SubCategoryId>,
}

impl From<EditItemRequest> for EditItemInput {
    fn from(req: EditItemRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location: req.location,
            subcategory_id: req.subcategory_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub item_id: ItemId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubCategoryId>,
    pub status: ItemStatus,
    pub bounty_coins: i64,
    pub finder_id: Option<UserId>,
    pub owner_confirmed: bool,
    pub finder_confirmed: bool,
    pub is_highlighted: bool,
    pub highlight_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LostItem> for ItemResponse {
    fn from(item: LostItem) -> Self {
        Self {
            item_id: item.id,
            owner_id: item.owner_id,
            title: item.title,
            description: item.description,
            location: item.location,
            category_id: item.category_id,
            subcategory_id: item.subcategory_id,
            status: item.status,
            bounty_coins: item.bounty_coins,
            finder_id: item.finder_id,
            owner_confirmed: item.owner_confirmed,
            finder_confirmed: item.finder_confirmed,
            is_highlighted: item.is_highlighted,
            highlight_expiry: item.highlight_expiry,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimCreatedResponse {
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub claim_id: ClaimId,
    pub user_id: UserId,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ItemClaim> for ClaimResponse {
    fn from(claim: ItemClaim) -> Self {
        Self {
            claim_id: claim.id,
            user_id: claim.user_id,
            user_name: claim.user_name,
            created_at: claim.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFinderRequest {
    pub finder_id: UserId,
}

/// Response for POST /api/items/{item_id}/confirm
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub settled: bool,
    pub bounty_paid: i64,
}

impl From<ConfirmOutcome> for ConfirmResponse {
    fn from(outcome: ConfirmOutcome) -> Self {
        Self {
            settled: outcome.settled,
            bounty_paid: outcome.payout.map(|(_, coins)| coins).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResponse {
    pub highlight_expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub comment_id: CommentId,
    pub user_id: UserId,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            comment_id: comment.id,
            user_id: comment.user_id,
            user_name: comment.user_name,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

impl From<ReportRequest> for SubmitReportInput {
    fn from(req: ReportRequest) -> Self {
        Self {
            reason: req.reason,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCreatedResponse {
    pub report_id: ReportId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportListQuery {
    /// `pending`, `reviewed` or `resolved`; all when absent
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report_id: ReportId,
    pub item_id: ItemId,
    pub item_title: String,
    pub item_owner_id: UserId,
    pub reporter_id: UserId,
    pub reason: ReportReason,
    pub description: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemReport> for ReportResponse {
    fn from(report: ItemReport) -> Self {
        Self {
            report_id: report.id,
            item_id: report.item_id,
            item_title: report.item_title,
            item_owner_id: report.item_owner_id,
            reporter_id: report.reporter_id,
            reason: report.reason,
            description: report.description,
            status: report.status,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}
