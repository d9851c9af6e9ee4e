//! Category tree lookups

use std::sync::Arc;

use kernel::id::{CategoryId, SubCategoryId};

use crate::domain::entity::category::{Category, Placement, SubCategory};
use crate::domain::repository::CategoryRepository;
use crate::error::{ItemError, ItemResult};

pub struct CategoryUseCase<R>
where
    R: CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> CategoryUseCase<R>
where
    R: CategoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> ItemResult<Vec<Category>> {
        self.repo.list_categories().await
    }

    pub async fn category(&self, category_id: CategoryId) -> ItemResult<Category> {
        self.repo
            .find_category(category_id)
            .await?
            .ok_or(ItemError::CategoryNotFound)
    }

    pub async fn subcategory(&self, subcategory_id: SubCategoryId) -> ItemResult<SubCategory> {
        self.repo
            .find_subcategory(subcategory_id)
            .await?
            .ok_or(ItemError::SubCategoryNotFound)
    }
}

/// Files a post under `subcategory_id` and its parent category. An unknown
/// id is a bad request here, since it comes from a submitted form.
pub(crate) async fn resolve_placement<R>(
    repo: &R,
    subcategory_id: Option<SubCategoryId>,
) -> ItemResult<Placement>
where
    R: CategoryRepository + Sync,
{
    let Some(subcategory_id) = subcategory_id else {
        return Ok(Placement::default());
    };

    let subcategory = repo
        .find_subcategory(subcategory_id)
        .await?
        .ok_or_else(|| ItemError::InvalidInput(format!("Unknown subcategory: {subcategory_id}")))?;
    Ok(Placement::of(&subcategory))
}
