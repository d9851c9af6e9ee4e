//! Notification Configuration

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl NotificationConfig {
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}
