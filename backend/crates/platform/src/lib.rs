//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no business meaning:
//! - Cryptographic utilities (SHA-512, HMAC-SHA256, Base64)
//! - Signed session tokens
//! - Cookie and header extraction

pub mod cookie;
pub mod crypto;
pub mod token;
