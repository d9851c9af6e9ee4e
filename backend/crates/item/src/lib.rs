//! Item Module
//!
//! Lost item posts and everything hanging off them: the return
//! confirmation state machine, bounty escrow and payout, claims, comments,
//! highlights, abuse reports, search and the category tree.
//!
//! ## Return confirmation
//! - Only the owner selects a finder; selecting resets both confirmations.
//! - The owner confirming sets both flags (the owner pays, so their word is
//!   final); the finder confirming sets only their own flag.
//! - Once both flags are set on a LOST item it becomes FOUND, its highlight
//!   is cleared and the escrowed bounty is paid to the finder, all in the
//!   same transaction as the status write.
//!
//! Every transition is a pure function on [`domain::entity::item::LostItem`];
//! the repository runs it under a row lock and applies the returned ledger
//! postings atomically.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::ItemConfig;
pub use error::{ItemError, ItemResult};
pub use infra::postgres::PgItemRepository;
pub use presentation::router::{item_admin_router, item_public_router, item_router};

#[cfg(test)]
mod tests;
