//! Notification Module
//!
//! In-app inbox. Other modules write through [`NotificationSink`] after their
//! own transaction has committed; users read and acknowledge entries through
//! the HTTP routes.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::NotificationConfig;
pub use domain::entity::{NewNotification, Notification, NotificationKind};
pub use domain::sink::{NotificationSink, deliver};
pub use error::{NotificationError, NotificationResult};
pub use infra::postgres::PgNotificationRepository;
pub use presentation::router::notification_router;
