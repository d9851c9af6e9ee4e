//! Application Layer - Use Cases

pub mod config;
pub mod inbox;
