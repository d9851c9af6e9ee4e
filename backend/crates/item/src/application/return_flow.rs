//! Return Confirmation Use Cases
//!
//! Claim, select finder, confirm. Settlement (status write plus bounty
//! payout) happens inside the repository transaction; the finder is
//! notified only after it has committed.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{ItemId, UserId};
use notification::{NewNotification, NotificationKind, NotificationSink, deliver};

use crate::domain::entity::claim::ItemClaim;
use crate::domain::entity::item::{ConfirmOutcome, Transition};
use crate::domain::repository::{ItemRepository, MemberDirectory};
use crate::error::{ItemError, ItemResult};

/// Record "I found this" for a LOST item
pub struct ClaimItemUseCase<R>
where
    R: ItemRepository,
{
    repo: Arc<R>,
}

impl<R> ClaimItemUseCase<R>
where
    R: ItemRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Returns whether a new claim was recorded. Duplicate claims and
    /// claims on FOUND items are silently ignored.
    pub async fn execute(&self, item_id: ItemId, actor: UserId) -> ItemResult<bool> {
        let item = self.repo.find(item_id).await?.ok_or(ItemError::ItemNotFound)?;
        if !item.is_lost() {
            tracing::debug!(item_id = %item_id, "Claim on returned item ignored");
            return Ok(false);
        }

        let created = self.repo.add_claim(item_id, actor).await?;
        if created {
            tracing::info!(item_id = %item_id, user_id = %actor, "Item claimed");
        }
        Ok(created)
    }
}

/// Claims on an item, visible to its owner only
pub struct ListClaimsUseCase<R>
where
    R: ItemRepository,
{
    repo: Arc<R>,
}

impl<R> ListClaimsUseCase<R>
where
    R: ItemRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, item_id: ItemId, actor: UserId) -> ItemResult<Vec<ItemClaim>> {
        let item = self.repo.find(item_id).await?.ok_or(ItemError::ItemNotFound)?;
        if !item.is_owner(actor) {
            return Err(ItemError::Unauthorized);
        }
        self.repo.list_claims(item_id).await
    }
}

pub struct SelectFinderUseCase<R>
where
    R: ItemRepository + MemberDirectory,
{
    repo: Arc<R>,
}

impl<R> SelectFinderUseCase<R>
where
    R: ItemRepository + MemberDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, item_id: ItemId, actor: UserId, candidate: UserId) -> ItemResult<()> {
        let item = self.repo.find(item_id).await?.ok_or(ItemError::ItemNotFound)?;
        if !item.is_owner(actor) {
            tracing::warn!(item_id = %item_id, actor = %actor, "Finder selection by non-owner");
            return Err(ItemError::Unauthorized);
        }
        if !self.repo.user_exists(candidate).await? {
            return Err(ItemError::CandidateNotFound);
        }

        self.repo
            .transition(item_id, |item| {
                item.select_finder(actor, candidate, Utc::now())?;
                Ok(Transition::new(()))
            })
            .await?;

        tracing::info!(item_id = %item_id, finder_id = %candidate, "Finder selected");
        Ok(())
    }
}

pub struct ConfirmReturnUseCase<R, N>
where
    R: ItemRepository,
    N: NotificationSink + Sync,
{
    repo: Arc<R>,
    sink: Arc<N>,
}

impl<R, N> ConfirmReturnUseCase<R, N>
where
    R: ItemRepository,
    N: NotificationSink + Sync,
{
    pub fn new(repo: Arc<R>, sink: Arc<N>) -> Self {
        Self { repo, sink }
    }

    pub async fn execute(&self, item_id: ItemId, actor: UserId) -> ItemResult<ConfirmOutcome> {
        let (outcome, title, finder_id) = self
            .repo
            .transition(item_id, |item| {
                let transition = item.confirm(actor, Utc::now())?;
                let title = item.title.clone();
                let finder_id = item.finder_id;
                Ok(transition.map(|outcome| (outcome, title, finder_id)))
            })
            .await
            .inspect_err(|e| {
                if matches!(e, ItemError::Unauthorized) {
                    tracing::warn!(item_id = %item_id, actor = %actor, "Confirmation by stranger");
                }
            })?;

        if outcome.settled {
            tracing::info!(
                item_id = %item_id,
                payout = outcome.payout.map(|(_, coins)| coins).unwrap_or(0),
                "Item returned"
            );

            if let Some(finder_id) = finder_id {
                let message = match outcome.payout {
                    Some((_, coins)) => {
                        format!("You received {coins} coins for returning \"{title}\".")
                    }
                    None => format!("The owner confirmed that \"{title}\" was returned."),
                };
                let notification =
                    NewNotification::new(finder_id, NotificationKind::Bounty, "Return confirmed", message)
                        .with_item(item_id);
                deliver(self.sink.as_ref(), vec![notification]).await;
            }
        }

        Ok(outcome)
    }
}
