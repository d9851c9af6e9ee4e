//! Lost Item Entity
//!
//! All state transitions live here as pure functions so that every caller
//! (PostgreSQL under a row lock, or an in-memory store in tests) runs the
//! exact same rules.

use account::CoinTransactionType;
use chrono::{DateTime, Duration, Utc};
use kernel::id::{CategoryId, ItemId, SubCategoryId, UserId};
use serde::Serialize;
use std::str::FromStr;

use crate::domain::entity::category::Placement;
use crate::error::{ItemError, ItemResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Lost,
    /// Terminal
    Found,
}

impl ItemStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Lost => "LOST",
            ItemStatus::Found => "FOUND",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOST" => Ok(ItemStatus::Lost),
            "FOUND" => Ok(ItemStatus::Found),
            _ => Err(ItemError::InvalidInput(format!("Unknown item status: {s}"))),
        }
    }
}

/// Balance change to apply in the same transaction as an item write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub user_id: UserId,
    pub delta: i64,
    pub transaction_type: CoinTransactionType,
}

impl Posting {
    pub fn credit(user_id: UserId, coins: i64, transaction_type: CoinTransactionType) -> Self {
        Self {
            user_id,
            delta: coins,
            transaction_type,
        }
    }

    pub fn debit(user_id: UserId, coins: i64, transaction_type: CoinTransactionType) -> Self {
        Self {
            user_id,
            delta: -coins,
            transaction_type,
        }
    }
}

/// Result of a transition: a value for the caller plus the ledger postings
/// that must commit with the item row.
#[derive(Debug, Clone)]
pub struct Transition<T> {
    pub value: T,
    pub postings: Vec<Posting>,
}

impl<T> Transition<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            postings: Vec::new(),
        }
    }

    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Transition<U> {
        Transition {
            value: f(self.value),
            postings: self.postings,
        }
    }
}

/// What a confirmation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOutcome {
    /// This call moved the item from LOST to FOUND
    pub settled: bool,
    /// Bounty paid to the finder by this call
    pub payout: Option<(UserId, i64)>,
}

/// Editable part of a post. The bounty is not editable once escrowed.
#[derive(Debug, Clone)]
pub struct ItemDetails {
    pub title: String,
    pub description: String,
    pub location: String,
    pub placement: Placement,
}

impl ItemDetails {
    pub const TITLE_MAX: usize = 120;
    pub const DESCRIPTION_MAX: usize = 2000;
    pub const LOCATION_MAX: usize = 200;

    /// Trim and validate
    pub fn parse(title: &str, description: &str, location: &str) -> ItemResult<Self> {
        let title = title.trim();
        let description = description.trim();
        let location = location.trim();

        if title.is_empty() {
            return Err(ItemError::InvalidInput("Title is required".into()));
        }
        if title.chars().count() > Self::TITLE_MAX {
            return Err(ItemError::InvalidInput(format!(
                "Title must be at most {} characters",
                Self::TITLE_MAX
            )));
        }
        if description.chars().count() > Self::DESCRIPTION_MAX {
            return Err(ItemError::InvalidInput(format!(
                "Description must be at most {} characters",
                Self::DESCRIPTION_MAX
            )));
        }
        if location.is_empty() {
            return Err(ItemError::InvalidInput("Location is required".into()));
        }
        if location.chars().count() > Self::LOCATION_MAX {
            return Err(ItemError::InvalidInput(format!(
                "Location must be at most {} characters",
                Self::LOCATION_MAX
            )));
        }

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            placement: Placement::default(),
        })
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

#[derive(Debug, Clone)]
pub struct LostItem {
    pub id: ItemId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubCategoryId>,
    pub status: ItemStatus,
    /// Escrowed from the owner when the post was created
    pub bounty_coins: i64,
    pub finder_id: Option<UserId>,
    pub owner_confirmed: bool,
    pub finder_confirmed: bool,
    pub is_highlighted: bool,
    pub highlight_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LostItem {
    /// New LOST post. The caller escrows `bounty_coins` with
    /// [`LostItem::escrow_posting`].
    pub fn new(owner_id: UserId, details: ItemDetails, bounty_coins: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(),
            owner_id,
            title: details.title,
            description: details.description,
            location: details.location,
            category_id: details.placement.category_id,
            subcategory_id: details.placement.subcategory_id,
            status: ItemStatus::Lost,
            bounty_coins,
            finder_id: None,
            owner_confirmed: false,
            finder_confirmed: false,
            is_highlighted: false,
            highlight_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn is_finder(&self, user_id: UserId) -> bool {
        self.finder_id == Some(user_id)
    }

    pub fn is_lost(&self) -> bool {
        self.status == ItemStatus::Lost
    }

    /// FOUND implies both confirmations and a finder.
    pub fn is_consistent(&self) -> bool {
        self.status == ItemStatus::Lost
            || (self.owner_confirmed && self.finder_confirmed && self.finder_id.is_some())
    }

    pub fn escrow_posting(&self) -> Option<Posting> {
        (self.bounty_coins > 0).then(|| {
            Posting::debit(self.owner_id, self.bounty_coins, CoinTransactionType::BountyEscrow)
        })
    }

    /// Owner picks (or re-picks) the finder. Both confirmations reset so a
    /// new finder always needs a fresh mutual confirmation.
    pub fn select_finder(&mut self, actor: UserId, candidate: UserId, now: DateTime<Utc>) -> ItemResult<()> {
        if !self.is_owner(actor) {
            return Err(ItemError::Unauthorized);
        }
        if !self.is_lost() {
            return Err(ItemError::AlreadyFound);
        }
        if candidate == self.owner_id {
            return Err(ItemError::InvalidInput(
                "You cannot select yourself as the finder".into(),
            ));
        }

        self.finder_id = Some(candidate);
        self.owner_confirmed = false;
        self.finder_confirmed = false;
        self.updated_at = now;
        Ok(())
    }

    /// Owner or finder confirms the return, then the settlement check runs.
    ///
    /// Confirming an item that is already FOUND succeeds without paying
    /// anything again.
    pub fn confirm(&mut self, actor: UserId, now: DateTime<Utc>) -> ItemResult<Transition<ConfirmOutcome>> {
        let is_owner = self.is_owner(actor);
        let is_finder = self.is_finder(actor);
        if !is_owner && !is_finder {
            return Err(ItemError::Unauthorized);
        }

        if !self.is_lost() {
            return Ok(Transition::new(ConfirmOutcome {
                settled: false,
                payout: None,
            }));
        }

        if self.finder_id.is_none() {
            return Err(ItemError::FinderNotSelected);
        }

        if is_owner {
            self.owner_confirmed = true;
            self.finder_confirmed = true;
        } else {
            self.finder_confirmed = true;
        }
        self.updated_at = now;

        Ok(self.settle())
    }

    /// LOST with both confirmations becomes FOUND and pays the bounty.
    fn settle(&mut self) -> Transition<ConfirmOutcome> {
        let not_settled = ConfirmOutcome {
            settled: false,
            payout: None,
        };

        let Some(finder_id) = self.finder_id else {
            return Transition::new(not_settled);
        };
        if !(self.is_lost() && self.owner_confirmed && self.finder_confirmed) {
            return Transition::new(not_settled);
        }

        self.status = ItemStatus::Found;
        self.is_highlighted = false;
        self.highlight_expiry = None;

        if self.bounty_coins > 0 {
            Transition::new(ConfirmOutcome {
                settled: true,
                payout: Some((finder_id, self.bounty_coins)),
            })
            .with_posting(Posting::credit(
                finder_id,
                self.bounty_coins,
                CoinTransactionType::BountyPayout,
            ))
        } else {
            Transition::new(ConfirmOutcome {
                settled: true,
                payout: None,
            })
        }
    }

    /// Owner pins a LOST item on top of listings for `duration`.
    pub fn highlight(
        &mut self,
        actor: UserId,
        cost: i64,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> ItemResult<Transition<DateTime<Utc>>> {
        if !self.is_owner(actor) {
            return Err(ItemError::Unauthorized);
        }
        if !self.is_lost() {
            return Err(ItemError::AlreadyFound);
        }

        let expiry = now + duration;
        self.is_highlighted = true;
        self.highlight_expiry = Some(expiry);
        self.updated_at = now;

        let transition = Transition::new(expiry);
        Ok(if cost > 0 {
            transition.with_posting(Posting::debit(
                self.owner_id,
                cost,
                CoinTransactionType::HighlightPurchase,
            ))
        } else {
            transition
        })
    }

    /// Clears a lapsed highlight; returns whether anything changed.
    pub fn expire_highlight(&mut self, now: DateTime<Utc>) -> bool {
        match self.highlight_expiry {
            Some(expiry) if self.is_highlighted && expiry <= now => {
                self.is_highlighted = false;
                self.highlight_expiry = None;
                true
            }
            _ => false,
        }
    }

    pub fn edit(&mut self, actor: UserId, details: ItemDetails, now: DateTime<Utc>) -> ItemResult<()> {
        if !self.is_owner(actor) {
            return Err(ItemError::Unauthorized);
        }
        self.title = details.title;
        self.description = details.description;
        self.location = details.location;
        self.category_id = details.placement.category_id;
        self.subcategory_id = details.placement.subcategory_id;
        self.updated_at = now;
        Ok(())
    }

    /// Postings for deleting the post. An unsettled bounty goes back to the
    /// owner; a paid one is already with the finder.
    pub fn removal(&self, actor: UserId, actor_is_admin: bool) -> ItemResult<Vec<Posting>> {
        if !self.is_owner(actor) && !actor_is_admin {
            return Err(ItemError::Unauthorized);
        }
        Ok(self
            .refund_posting()
            .into_iter()
            .collect())
    }

    fn refund_posting(&self) -> Option<Posting> {
        (self.is_lost() && self.bounty_coins > 0).then(|| {
            Posting::credit(self.owner_id, self.bounty_coins, CoinTransactionType::BountyRefund)
        })
    }
}
