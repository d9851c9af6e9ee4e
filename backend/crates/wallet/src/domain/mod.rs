//! Domain Layer

pub mod gateway;
pub mod repository;
pub mod signature;
pub mod topup;
pub mod withdrawal;
