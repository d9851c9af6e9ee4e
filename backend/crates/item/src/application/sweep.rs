//! Highlight expiry sweep

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::repository::ItemRepository;
use crate::error::ItemResult;

pub struct ExpireHighlightsUseCase<R>
where
    R: ItemRepository,
{
    repo: Arc<R>,
}

impl<R> ExpireHighlightsUseCase<R>
where
    R: ItemRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, now: DateTime<Utc>) -> ItemResult<u64> {
        let expired = self.repo.expire_highlights(now).await?;
        if expired > 0 {
            tracing::info!(expired, "Expired highlights cleared");
        }
        Ok(expired)
    }
}
