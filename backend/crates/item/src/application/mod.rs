//! Application Layer - Use Cases

pub mod browse;
pub mod categories;
pub mod comments;
pub mod config;
pub mod manage_item;
pub mod moderation;
pub mod return_flow;
pub mod sweep;
