//! Wallet Configuration

use crate::error::{WalletError, WalletResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidtransEnvironment {
    Sandbox,
    Production,
}

impl MidtransEnvironment {
    /// `production` selects production; anything else is sandbox
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            MidtransEnvironment::Production
        } else {
            MidtransEnvironment::Sandbox
        }
    }

    pub const fn snap_url(&self) -> &'static str {
        match self {
            MidtransEnvironment::Sandbox => "https://app.sandbox.midtrans.com/snap/v1/transactions",
            MidtransEnvironment::Production => "https://app.midtrans.com/snap/v1/transactions",
        }
    }

    pub const fn api_base_url(&self) -> &'static str {
        match self {
            MidtransEnvironment::Sandbox => "https://api.sandbox.midtrans.com",
            MidtransEnvironment::Production => "https://api.midtrans.com",
        }
    }
}

/// One purchasable coin amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinPackage {
    pub coins: i64,
    /// IDR
    pub price: i64,
}

#[derive(Clone)]
pub struct WalletConfig {
    pub packages: Vec<CoinPackage>,
    pub withdrawal_min_coins: i64,
    /// Withdrawals must be a multiple of this
    pub withdrawal_step_coins: i64,
    pub idr_per_coin: i64,
    /// Page size of the user's top-up and withdrawal history
    pub history_limit: i64,
    /// Page size of the admin withdrawal queue
    pub admin_page_limit: i64,
    /// Midtrans server key; signs webhooks and authenticates API calls
    pub server_key: String,
    pub client_key: String,
    pub environment: MidtransEnvironment,
}

// Keys stay out of logs.
impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("packages", &self.packages)
            .field("withdrawal_min_coins", &self.withdrawal_min_coins)
            .field("withdrawal_step_coins", &self.withdrawal_step_coins)
            .field("idr_per_coin", &self.idr_per_coin)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            packages: vec![
                CoinPackage { coins: 100, price: 1_000 },
                CoinPackage { coins: 500, price: 5_000 },
                CoinPackage { coins: 1_000, price: 10_000 },
            ],
            withdrawal_min_coins: 100,
            withdrawal_step_coins: 100,
            idr_per_coin: 10,
            history_limit: 20,
            admin_page_limit: 100,
            server_key: String::new(),
            client_key: String::new(),
            environment: MidtransEnvironment::Sandbox,
        }
    }
}

impl WalletConfig {
    /// Create config for development (sandbox, given keys)
    pub fn development(server_key: impl Into<String>, client_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
            client_key: client_key.into(),
            ..Default::default()
        }
    }

    /// IDR price of a coin amount, `InvalidAmount` if it is not for sale
    pub fn price_for(&self, coins: i64) -> WalletResult<i64> {
        self.packages
            .iter()
            .find(|p| p.coins == coins)
            .map(|p| p.price)
            .ok_or_else(|| {
                let offered: Vec<String> = self.packages.iter().map(|p| p.coins.to_string()).collect();
                WalletError::InvalidAmount(format!(
                    "Invalid coin amount. Choose {}",
                    offered.join(", ")
                ))
            })
    }

    /// IDR paid out for a withdrawal of `coins`
    pub fn withdrawal_amount(&self, coins: i64) -> WalletResult<i64> {
        if coins < self.withdrawal_min_coins || coins % self.withdrawal_step_coins != 0 {
            return Err(WalletError::InvalidAmount(format!(
                "Minimum {} coins and a multiple of {}",
                self.withdrawal_min_coins, self.withdrawal_step_coins
            )));
        }
        coins
            .checked_mul(self.idr_per_coin)
            .ok_or_else(|| WalletError::InvalidAmount("Amount too large".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_table() {
        let config = WalletConfig::default();
        assert_eq!(config.price_for(100).unwrap(), 1_000);
        assert_eq!(config.price_for(500).unwrap(), 5_000);
        assert_eq!(config.price_for(1_000).unwrap(), 10_000);
        assert!(matches!(config.price_for(250), Err(WalletError::InvalidAmount(_))));
        assert!(config.price_for(0).is_err());
    }

    #[test]
    fn test_withdrawal_amount() {
        let config = WalletConfig::default();
        assert_eq!(config.withdrawal_amount(100).unwrap(), 1_000);
        assert_eq!(config.withdrawal_amount(1_200).unwrap(), 12_000);
        assert!(config.withdrawal_amount(50).is_err());
        assert!(config.withdrawal_amount(150).is_err());
        assert!(config.withdrawal_amount(-100).is_err());
    }

    #[test]
    fn test_environment() {
        assert_eq!(
            MidtransEnvironment::from_env_value("Production"),
            MidtransEnvironment::Production
        );
        assert_eq!(MidtransEnvironment::from_env_value(""), MidtransEnvironment::Sandbox);
        assert!(MidtransEnvironment::Sandbox.snap_url().contains("sandbox"));
    }

    #[test]
    fn test_debug_hides_keys() {
        let config = WalletConfig::development("SB-Mid-server-secret", "SB-Mid-client");
        assert!(!format!("{config:?}").contains("secret"));
    }
}
