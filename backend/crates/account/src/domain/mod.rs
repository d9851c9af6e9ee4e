//! Domain Layer
//!
//! - `entity` - User, CurrentUser, ledger entries
//! - `ledger` - transaction types and the non-negative balance rule
//! - `repository` - persistence interface
//! - `user_name` - validated public handle

pub mod entity;
pub mod ledger;
pub mod repository;
pub mod user_name;
