//! Item Categories

use kernel::id::{CategoryId, SubCategoryId};

#[derive(Debug, Clone)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub category_id: CategoryId,
    pub name: String,
}

/// Top-level category with its subcategories in display order
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub subcategories: Vec<SubCategory>,
}

/// Where a post is filed. A post carries at most one subcategory, and its
/// category is always the subcategory's parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubCategoryId>,
}

impl Placement {
    pub fn of(subcategory: &SubCategory) -> Self {
        Self {
            category_id: Some(subcategory.category_id),
            subcategory_id: Some(subcategory.id),
        }
    }
}
