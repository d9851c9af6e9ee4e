//! Wallet Error Types

use account::LedgerError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::gateway::GatewayError;

pub type WalletResult<T> = Result<T, WalletError>;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("{0}")]
    InvalidAmount(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Transaction not found")]
    TransactionNotFound,

    #[error("Withdrawal request not found")]
    WithdrawalNotFound,

    #[error("User not found")]
    UserNotFound,

    /// The order or request belongs to someone else
    #[error("Not authorized for this transaction")]
    Unauthorized,

    #[error("Request is not pending")]
    NotPending,

    #[error("Insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: i64, required: i64 },

    #[error("Payment gateway unavailable: {0}")]
    UpstreamUnavailable(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WalletError::InvalidAmount(_) | WalletError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            WalletError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WalletError::TransactionNotFound
            | WalletError::WithdrawalNotFound
            | WalletError::UserNotFound => StatusCode::NOT_FOUND,
            WalletError::Unauthorized => StatusCode::FORBIDDEN,
            WalletError::NotPending => StatusCode::CONFLICT,
            WalletError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WalletError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WalletError::Database(_) | WalletError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidAmount(_) | WalletError::InvalidInput(_) => ErrorKind::BadRequest,
            WalletError::InvalidSignature => ErrorKind::Unauthorized,
            WalletError::TransactionNotFound
            | WalletError::WithdrawalNotFound
            | WalletError::UserNotFound => ErrorKind::NotFound,
            WalletError::Unauthorized => ErrorKind::Forbidden,
            WalletError::NotPending => ErrorKind::Conflict,
            WalletError::InsufficientBalance { .. } => ErrorKind::InsufficientFunds,
            WalletError::UpstreamUnavailable(_) => ErrorKind::ServiceUnavailable,
            WalletError::Database(_) | WalletError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            WalletError::Database(e) => {
                tracing::error!(error = %e, "Wallet database error");
            }
            WalletError::Internal(msg) => {
                tracing::error!(message = %msg, "Wallet internal error");
            }
            WalletError::UpstreamUnavailable(e) => {
                tracing::error!(error = %e, "Payment gateway call failed");
            }
            WalletError::InvalidSignature => {
                tracing::warn!("Webhook with invalid signature rejected");
            }
            WalletError::Unauthorized => {
                tracing::warn!("Access to foreign transaction rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Wallet error");
            }
        }
    }
}

impl From<LedgerError> for WalletError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance { balance, required } => {
                WalletError::InsufficientBalance { balance, required }
            }
            LedgerError::UserNotFound => WalletError::UserNotFound,
            LedgerError::Database(e) => WalletError::Database(e),
            other => WalletError::Internal(other.to_string()),
        }
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Database(e) => AppError::from(e),
            WalletError::Internal(_) => AppError::internal("Internal error"),
            WalletError::UpstreamUnavailable(_) => {
                AppError::service_unavailable("Payment gateway unavailable")
                    .with_action("Try again in a moment")
            }
            WalletError::InsufficientBalance { .. } => {
                AppError::insufficient_funds(err.to_string()).with_action("Top up your coins first")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
