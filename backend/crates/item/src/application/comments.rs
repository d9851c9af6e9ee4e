//! Comments

use std::sync::Arc;

use kernel::id::{ItemId, UserId};

use crate::domain::entity::comment::{Comment, parse_content};
use crate::domain::repository::ItemRepository;
use crate::error::{ItemError, ItemResult};

pub struct CommentUseCase<R>
where
    R: ItemRepository,
{
    repo: Arc<R>,
}

impl<R> CommentUseCase<R>
where
    R: ItemRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn post(&self, item_id: ItemId, author: UserId, raw: &str) -> ItemResult<Comment> {
        let content = parse_content(raw)?;
        self.repo.find(item_id).await?.ok_or(ItemError::ItemNotFound)?;
        let comment = self.repo.add_comment(item_id, author, &content).await?;
        tracing::debug!(item_id = %item_id, comment_id = %comment.id, "Comment posted");
        Ok(comment)
    }

    pub async fn list(&self, item_id: ItemId) -> ItemResult<Vec<Comment>> {
        self.repo.find(item_id).await?.ok_or(ItemError::ItemNotFound)?;
        self.repo.list_comments(item_id).await
    }
}
