//! Comment

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, ItemId, UserId};

use crate::error::{ItemError, ItemResult};

pub const COMMENT_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Trimmed, non-empty comment body
pub fn parse_content(raw: &str) -> ItemResult<String> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ItemError::InvalidInput("Comment cannot be empty".into()));
    }
    if content.chars().count() > COMMENT_MAX_CHARS {
        return Err(ItemError::InvalidInput(format!(
            "Comment must be at most {COMMENT_MAX_CHARS} characters"
        )));
    }
    Ok(content.to_string())
}
