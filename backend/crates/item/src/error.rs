//! Item Error Types

use account::LedgerError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type ItemResult<T> = Result<T, ItemError>;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found")]
    ItemNotFound,

    #[error("Selected user not found")]
    CandidateNotFound,

    #[error("Report not found")]
    ReportNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Subcategory not found")]
    SubCategoryNotFound,

    /// Caller lacks the owner / finder / admin relation the action requires
    #[error("Not authorized for this item")]
    Unauthorized,

    #[error("No finder has been selected yet")]
    FinderNotSelected,

    #[error("Item has already been returned")]
    AlreadyFound,

    #[error("You have already reported this post")]
    AlreadyReported,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: i64, required: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ItemError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ItemError::ItemNotFound
            | ItemError::CandidateNotFound
            | ItemError::ReportNotFound
            | ItemError::CategoryNotFound
            | ItemError::SubCategoryNotFound => StatusCode::NOT_FOUND,
            ItemError::Unauthorized => StatusCode::FORBIDDEN,
            ItemError::FinderNotSelected | ItemError::AlreadyFound | ItemError::AlreadyReported => {
                StatusCode::CONFLICT
            }
            ItemError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ItemError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ItemError::Database(_) | ItemError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ItemError::ItemNotFound
            | ItemError::CandidateNotFound
            | ItemError::ReportNotFound
            | ItemError::CategoryNotFound
            | ItemError::SubCategoryNotFound => ErrorKind::NotFound,
            ItemError::Unauthorized => ErrorKind::Forbidden,
            ItemError::FinderNotSelected | ItemError::AlreadyFound | ItemError::AlreadyReported => {
                ErrorKind::Conflict
            }
            ItemError::InvalidInput(_) => ErrorKind::BadRequest,
            ItemError::InsufficientBalance { .. } => ErrorKind::InsufficientFunds,
            ItemError::Database(_) | ItemError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            ItemError::Database(e) => {
                tracing::error!(error = %e, "Item database error");
            }
            ItemError::Internal(msg) => {
                tracing::error!(message = %msg, "Item internal error");
            }
            ItemError::Unauthorized => {
                tracing::warn!("Unauthorized item action rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Item error");
            }
        }
    }
}

impl From<LedgerError> for ItemError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance { balance, required } => {
                ItemError::InsufficientBalance { balance, required }
            }
            LedgerError::Database(e) => ItemError::Database(e),
            other => ItemError::Internal(other.to_string()),
        }
    }
}

impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::Database(e) => AppError::from(e),
            ItemError::Internal(_) => AppError::internal("Internal error"),
            ItemError::InsufficientBalance { .. } => {
                AppError::insufficient_funds(err.to_string()).with_action("Top up your coins first")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
