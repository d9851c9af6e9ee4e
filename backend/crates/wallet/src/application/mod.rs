//! Application Layer - Use Cases

pub mod config;
pub mod topup;
pub mod withdrawal;
