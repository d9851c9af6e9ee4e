//! Account Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::user_name::UserNameError;

pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug, Error)]
pub enum AccountError {
    /// No session, or the token failed verification
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Account is banned")]
    Banned,

    #[error("Administrator privileges required")]
    AdminRequired,

    #[error("Administrators cannot moderate their own account")]
    SelfModeration,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid user name: {0}")]
    InvalidUserName(#[from] UserNameError),

    #[error("Username already used")]
    UserNameTaken,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccountError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccountError::Banned | AccountError::AdminRequired => StatusCode::FORBIDDEN,
            AccountError::SelfModeration | AccountError::InvalidUserName(_) => {
                StatusCode::BAD_REQUEST
            }
            AccountError::UserNotFound => StatusCode::NOT_FOUND,
            AccountError::UserNameTaken => StatusCode::CONFLICT,
            AccountError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::Unauthenticated => ErrorKind::Unauthorized,
            AccountError::Banned | AccountError::AdminRequired => ErrorKind::Forbidden,
            AccountError::SelfModeration | AccountError::InvalidUserName(_) => {
                ErrorKind::BadRequest
            }
            AccountError::UserNotFound => ErrorKind::NotFound,
            AccountError::UserNameTaken => ErrorKind::Conflict,
            AccountError::Database(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            AccountError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AccountError::Banned | AccountError::AdminRequired => {
                tracing::warn!(error = %self, "Account access denied");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Database(e) => AppError::from(e),
            AccountError::Banned => AppError::new(ErrorKind::Forbidden, "Account is banned")
                .with_action("Contact an administrator"),
            AccountError::UserNameTaken => AppError::new(ErrorKind::Conflict, "Username already used")
                .with_action("Choose a different user name"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

/// Failure of a wallet mutation
///
/// Produced by [`crate::domain::ledger::apply_delta`] and
/// [`crate::infra::ledger::post_entry`]; other modules fold it into their
/// own error enums.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: i64, required: i64 },

    #[error("Balance overflow")]
    Overflow,

    #[error("Wallet owner not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
