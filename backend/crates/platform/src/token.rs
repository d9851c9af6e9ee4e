//! Signed Session Tokens
//!
//! Layout before encoding (56 bytes):
//!
//! ```text
//! user_uuid[16] || expires_at_ms[8, big endian] || HMAC-SHA256(secret, first 24 bytes)[32]
//! ```
//!
//! The token is encoded with URL-safe base64 so it can be stored in a cookie
//! verbatim. Tokens are issued by the identity service that shares the
//! secret; this crate only needs [`verify`], [`sign`] exists for that service
//! and for tests.

use thiserror::Error;
use uuid::Uuid;

use crate::crypto::{constant_time_eq, from_base64_url, hmac_sha256, to_base64_url};

const PAYLOAD_LEN: usize = 16 + 8;
const TOKEN_LEN: usize = PAYLOAD_LEN + 32;

/// Claims carried by a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub expires_at_ms: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is not valid base64")]
    Encoding,
    #[error("Token has wrong length")]
    Length,
    #[error("Token signature mismatch")]
    Signature,
    #[error("Token expired")]
    Expired,
}

/// Issue a token for `user_id` valid until `expires_at_ms`.
pub fn sign(user_id: Uuid, expires_at_ms: i64, secret: &[u8]) -> String {
    let mut data = Vec::with_capacity(TOKEN_LEN);
    data.extend_from_slice(user_id.as_bytes());
    data.extend_from_slice(&expires_at_ms.to_be_bytes());
    let signature = hmac_sha256(secret, &data);
    data.extend_from_slice(&signature);
    to_base64_url(&data)
}

/// Verify signature and expiry. The signature is checked before the expiry
/// so a forged token never reveals whether it would have been fresh.
pub fn verify(token: &str, secret: &[u8], now_ms: i64) -> Result<SessionClaims, TokenError> {
    let data = from_base64_url(token.trim()).map_err(|_| TokenError::Encoding)?;
    if data.len() != TOKEN_LEN {
        return Err(TokenError::Length);
    }

    let (payload, signature) = data.split_at(PAYLOAD_LEN);
    let expected = hmac_sha256(secret, payload);
    if !constant_time_eq(&expected, signature) {
        return Err(TokenError::Signature);
    }

    let mut uuid_bytes = [0u8; 16];
    uuid_bytes.copy_from_slice(&payload[..16]);
    let mut expiry_bytes = [0u8; 8];
    expiry_bytes.copy_from_slice(&payload[16..]);
    let expires_at_ms = i64::from_be_bytes(expiry_bytes);

    if expires_at_ms <= now_ms {
        return Err(TokenError::Expired);
    }

    Ok(SessionClaims {
        user_id: Uuid::from_bytes(uuid_bytes),
        expires_at_ms,
    })
}
