//! Account Configuration

/// Account application configuration
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Cookie carrying the session token
    pub session_cookie_name: String,
    /// HMAC key shared with the identity service (32 bytes)
    pub session_secret: [u8; 32],
    /// Default page size for the ledger listing
    pub ledger_default_limit: i64,
    /// Upper bound for any client supplied ledger limit
    pub ledger_max_limit: i64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "temuin_session".to_string(),
            session_secret: [0u8; 32],
            ledger_default_limit: 20,
            ledger_max_limit: 100,
        }
    }
}

impl AccountConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    pub fn clamp_ledger_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.ledger_default_limit)
            .clamp(1, self.ledger_max_limit)
    }
}
