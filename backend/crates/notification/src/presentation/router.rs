//! Notification Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::NotificationConfig;
use crate::domain::repository::NotificationRepository;
use crate::infra::postgres::PgNotificationRepository;
use crate::presentation::handlers::{self, NotificationAppState};

/// `/api/notifications` routes (expects `require_user` to be layered on top)
pub fn notification_router(repo: PgNotificationRepository, config: NotificationConfig) -> Router {
    notification_router_generic(repo, config)
}

pub fn notification_router_generic<R>(repo: R, config: NotificationConfig) -> Router
where
    R: NotificationRepository + Clone + Send + Sync + 'static,
{
    let state = NotificationAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(handlers::list::<R>))
        .route("/unread-count", get(handlers::unread_count::<R>))
        .route("/read-all", post(handlers::mark_all_read::<R>))
        .route("/{notification_id}/read", post(handlers::mark_read::<R>))
        .with_state(state)
}
