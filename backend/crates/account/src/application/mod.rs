//! Application Layer - Use Cases

pub mod authenticate;
pub mod config;
pub mod moderate_user;
pub mod profile;
