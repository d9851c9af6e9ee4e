//! Item Claim
//!
//! "I found this" marker. At most one per (item, user); the owner picks the
//! finder among claimants.

use chrono::{DateTime, Utc};
use kernel::id::{ClaimId, ItemId, UserId};

#[derive(Debug, Clone)]
pub struct ItemClaim {
    pub id: ClaimId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}
