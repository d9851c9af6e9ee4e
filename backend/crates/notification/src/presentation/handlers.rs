//! HTTP Handlers

use std::sync::Arc;

use account::CurrentUser;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use kernel::id::NotificationId;

use crate::application::config::NotificationConfig;
use crate::application::inbox::InboxUseCase;
use crate::domain::repository::NotificationRepository;
use crate::error::NotificationResult;
use crate::presentation::dto::{InboxResponse, ListQuery, MarkedResponse, UnreadCountResponse};

#[derive(Clone)]
pub struct NotificationAppState<R>
where
    R: NotificationRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<NotificationConfig>,
}

impl<R> NotificationAppState<R>
where
    R: NotificationRepository + Clone + Send + Sync + 'static,
{
    fn inbox(&self) -> InboxUseCase<R> {
        InboxUseCase::new(self.repo.clone(), self.config.clone())
    }
}

/// GET /api/notifications
pub async fn list<R>(
    State(state): State<NotificationAppState<R>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> NotificationResult<Json<InboxResponse>>
where
    R: NotificationRepository + Clone + Send + Sync + 'static,
{
    let output = state.inbox().list(user.id, query.limit).await?;
    Ok(Json(InboxResponse {
        notifications: output.notifications.into_iter().map(Into::into).collect(),
        unread_count: output.unread_count,
    }))
}

/// GET /api/notifications/unread-count
pub async fn unread_count<R>(
    State(state): State<NotificationAppState<R>>,
    Extension(user): Extension<CurrentUser>,
) -> NotificationResult<Json<UnreadCountResponse>>
where
    R: NotificationRepository + Clone + Send + Sync + 'static,
{
    let unread_count = state.inbox().unread_count(user.id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// POST /api/notifications/{notification_id}/read
pub async fn mark_read<R>(
    State(state): State<NotificationAppState<R>>,
    Extension(user): Extension<CurrentUser>,
    Path(notification_id): Path<NotificationId>,
) -> NotificationResult<StatusCode>
where
    R: NotificationRepository + Clone + Send + Sync + 'static,
{
    state.inbox().mark_read(user.id, notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/notifications/read-all
pub async fn mark_all_read<R>(
    State(state): State<NotificationAppState<R>>,
    Extension(user): Extension<CurrentUser>,
) -> NotificationResult<Json<MarkedResponse>>
where
    R: NotificationRepository + Clone + Send + Sync + 'static,
{
    let updated = state.inbox().mark_all_read(user.id).await?;
    Ok(Json(MarkedResponse { updated }))
}
