//! Post lifecycle: create (with bounty escrow), edit, highlight, delete

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{ItemId, SubCategoryId, UserId};
use notification::{NewNotification, NotificationKind, NotificationSink, deliver};

use crate::application::categories::resolve_placement;
use crate::application::config::ItemConfig;
use crate::domain::entity::item::{ItemDetails, LostItem, Transition};
use crate::domain::repository::{CategoryRepository, ItemRepository};
use crate::error::{ItemError, ItemResult};

#[derive(Debug, Clone)]
pub struct CreateItemInput {
    pub title: String,
    pub description: String,
    pub location: String,
    pub subcategory_id: Option<SubCategoryId>,
    pub bounty_coins: i64,
}

pub struct CreateItemUseCase<R>
where
    R: ItemRepository + CategoryRepository,
{
    repo: Arc<R>,
    config: Arc<ItemConfig>,
}

impl<R> CreateItemUseCase<R>
where
    R: ItemRepository + CategoryRepository + Sync,
{
    pub fn new(repo: Arc<R>, config: Arc<ItemConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, owner: UserId, input: CreateItemInput) -> ItemResult<LostItem> {
        let details = ItemDetails::parse(&input.title, &input.description, &input.location)?
            .with_placement(resolve_placement(self.repo.as_ref(), input.subcategory_id).await?);
        if input.bounty_coins < 0 || input.bounty_coins > self.config.max_bounty {
            return Err(ItemError::InvalidInput(format!(
                "Bounty must be between 0 and {} coins",
                self.config.max_bounty
            )));
        }

        let item = LostItem::new(owner, details, input.bounty_coins, Utc::now());
        let postings: Vec<_> = item.escrow_posting().into_iter().collect();
        self.repo.create(&item, &postings).await?;

        tracing::info!(
            item_id = %item.id,
            owner_id = %owner,
            bounty = item.bounty_coins,
            "Lost item posted"
        );
        Ok(item)
    }
}

#[derive(Debug, Clone)]
pub struct EditItemInput {
    pub title: String,
    pub description: String,
    pub location: String,
    pub subcategory_id: Option<SubCategoryId>,
}

pub struct EditItemUseCase<R>
where
    R: ItemRepository + CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> EditItemUseCase<R>
where
    R: ItemRepository + CategoryRepository + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, item_id: ItemId, actor: UserId, input: EditItemInput) -> ItemResult<LostItem> {
        let details = ItemDetails::parse(&input.title, &input.description, &input.location)?
            .with_placement(resolve_placement(self.repo.as_ref(), input.subcategory_id).await?);
        let item = self
            .repo
            .transition(item_id, |item| {
                item.edit(actor, details, Utc::now())?;
                Ok(Transition::new(item.clone()))
            })
            .await?;

        tracing::info!(item_id = %item_id, "Lost item edited");
        Ok(item)
    }
}

pub struct HighlightItemUseCase<R>
where
    R: ItemRepository,
{
    repo: Arc<R>,
    config: Arc<ItemConfig>,
}

impl<R> HighlightItemUseCase<R>
where
    R: ItemRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ItemConfig>) -> Self {
        Self { repo, config }
    }

    /// Charges the owner and returns the new expiry
    pub async fn execute(&self, item_id: ItemId, actor: UserId) -> ItemResult<DateTime<Utc>> {
        let cost = self.config.highlight_cost;
        let duration = self.config.highlight_duration_chrono();

        let expiry = self
            .repo
            .transition(item_id, |item| item.highlight(actor, cost, duration, Utc::now()))
            .await?;

        tracing::info!(item_id = %item_id, cost, expiry = %expiry, "Item highlighted");
        Ok(expiry)
    }
}

pub struct DeleteItemUseCase<R, N>
where
    R: ItemRepository,
    N: NotificationSink + Sync,
{
    repo: Arc<R>,
    sink: Arc<N>,
}

impl<R, N> DeleteItemUseCase<R, N>
where
    R: ItemRepository,
    N: NotificationSink + Sync,
{
    pub fn new(repo: Arc<R>, sink: Arc<N>) -> Self {
        Self { repo, sink }
    }

    /// Owner removes a post, or an admin when `as_admin` is set; an
    /// unsettled bounty is refunded.
    pub async fn execute(&self, item_id: ItemId, actor_id: UserId, as_admin: bool) -> ItemResult<()> {
        let mut refunded = 0;
        let item = self
            .repo
            .remove(item_id, |item| {
                let postings = item.removal(actor_id, as_admin)?;
                refunded = postings.iter().map(|p| p.delta).sum();
                Ok(postings)
            })
            .await?;

        tracing::info!(
            item_id = %item_id,
            actor = %actor_id,
            by_admin = !item.is_owner(actor_id),
            refunded,
            "Lost item deleted"
        );

        let mut notifications = Vec::new();
        if !item.is_owner(actor_id) {
            notifications.push(NewNotification::new(
                item.owner_id,
                NotificationKind::Warning,
                "Post removed",
                format!("Your post \"{}\" was removed by an administrator.", item.title),
            ));
        }
        if refunded > 0 {
            notifications.push(
                NewNotification::new(
                    item.owner_id,
                    NotificationKind::Bounty,
                    "Bounty refunded",
                    format!("{refunded} coins from \"{}\" were returned to your wallet.", item.title),
                )
                .with_reference_url("/wallet"),
            );
        }
        deliver(self.sink.as_ref(), notifications).await;

        Ok(())
    }
}
