//! Read side: detail, browse, search, highlights

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{CategoryId, ItemId, SubCategoryId};

use crate::application::config::ItemConfig;
use crate::domain::entity::item::{ItemStatus, LostItem};
use crate::domain::repository::{BrowseFilter, CategoryRepository, ItemRepository};
use crate::error::{ItemError, ItemResult};

/// Browse page query. Blank text filters are ignored.
#[derive(Debug, Clone, Default)]
pub struct ItemSearch {
    pub status: Option<ItemStatus>,
    pub query: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubCategoryId>,
    pub limit: Option<i64>,
}

pub struct BrowseItemsUseCase<R>
where
    R: ItemRepository + CategoryRepository,
{
    repo: Arc<R>,
    config: Arc<ItemConfig>,
}

impl<R> BrowseItemsUseCase<R>
where
    R: ItemRepository + CategoryRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ItemConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn detail(&self, item_id: ItemId) -> ItemResult<LostItem> {
        self.repo.find(item_id).await?.ok_or(ItemError::ItemNotFound)
    }

    /// Unknown category or subcategory ids are 404s rather than empty pages.
    pub async fn browse(&self, search: ItemSearch) -> ItemResult<Vec<LostItem>> {
        if let Some(category_id) = search.category_id {
            self.repo
                .find_category(category_id)
                .await?
                .ok_or(ItemError::CategoryNotFound)?;
        }
        if let Some(subcategory_id) = search.subcategory_id {
            self.repo
                .find_subcategory(subcategory_id)
                .await?
                .ok_or(ItemError::SubCategoryNotFound)?;
        }

        self.expire_stale_highlights().await;
        self.repo
            .browse(BrowseFilter {
                status: search.status,
                highlighted_only: false,
                query: non_blank(search.query),
                location: non_blank(search.location),
                category_id: search.category_id,
                subcategory_id: search.subcategory_id,
                limit: self.config.clamp_browse_limit(search.limit),
            })
            .await
    }

    /// Highlighted LOST posts, across all categories or within one
    pub async fn highlights(
        &self,
        category_id: Option<CategoryId>,
        limit: Option<i64>,
    ) -> ItemResult<Vec<LostItem>> {
        if let Some(category_id) = category_id {
            self.repo
                .find_category(category_id)
                .await?
                .ok_or(ItemError::CategoryNotFound)?;
        }

        self.expire_stale_highlights().await;
        self.repo
            .browse(BrowseFilter {
                status: Some(ItemStatus::Lost),
                highlighted_only: true,
                category_id,
                limit: self.config.clamp_browse_limit(limit),
                ..BrowseFilter::default()
            })
            .await
    }

    /// Listings must not show lapsed highlights even between sweeps.
    async fn expire_stale_highlights(&self) {
        if let Err(e) = self.repo.expire_highlights(Utc::now()).await {
            tracing::warn!(error = %e, "Highlight expiry before browse failed");
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
