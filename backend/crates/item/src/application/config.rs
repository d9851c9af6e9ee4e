//! Item Configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ItemConfig {
    /// Coins charged for one highlight
    pub highlight_cost: i64,
    /// How long a highlight lasts
    pub highlight_duration: Duration,
    /// Upper bound for the bounty of a single post
    pub max_bounty: i64,
    pub browse_default_limit: i64,
    pub browse_max_limit: i64,
    /// Page size of the admin report queue
    pub report_page_limit: i64,
    /// Interval of the background highlight sweep
    pub highlight_sweep_interval: Duration,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            highlight_cost: 50,
            highlight_duration: Duration::from_secs(24 * 60 * 60),
            max_bounty: 1_000_000,
            browse_default_limit: 20,
            browse_max_limit: 100,
            report_page_limit: 100,
            highlight_sweep_interval: Duration::from_secs(60),
        }
    }
}

impl ItemConfig {
    /// Create config for development (faster sweep)
    pub fn development() -> Self {
        Self {
            highlight_sweep_interval: Duration::from_secs(10),
            ..Default::default()
        }
    }

    pub fn highlight_duration_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.highlight_duration).unwrap_or(chrono::Duration::hours(24))
    }

    pub fn clamp_browse_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.browse_default_limit)
            .clamp(1, self.browse_max_limit)
    }
}
