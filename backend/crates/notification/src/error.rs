//! Notification Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// Absent, or owned by another user
    #[error("Notification not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl NotificationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NotificationError::NotFound => StatusCode::NOT_FOUND,
            NotificationError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NotificationError::NotFound => ErrorKind::NotFound,
            NotificationError::Database(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            NotificationError::Database(e) => {
                tracing::error!(error = %e, "Notification database error");
            }
            NotificationError::NotFound => {
                tracing::debug!("Notification not found");
            }
        }
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Database(e) => AppError::from(e),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
