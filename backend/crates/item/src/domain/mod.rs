//! Domain Layer
//!
//! - `entity` - LostItem (state machine), categories, claims, comments, reports
//! - `repository` - persistence interfaces

pub mod entity;
pub mod repository;
