//! Shared Kernel
//!
//! Vocabulary every Temuin crate agrees on:
//! - the unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - typed entity identifiers ([`id::UserId`], [`id::ItemId`], ...)
//!
//! Only things whose meaning is identical across accounts, items, wallet
//! and notifications belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
