//! Ledger posting
//!
//! The one place that writes `users.coin_balance`. Always called with a
//! connection that is already inside a transaction owned by the caller, so
//! the balance change commits or rolls back together with the event that
//! triggered it.

use kernel::id::{CoinTransactionId, UserId};
use sqlx::PgConnection;

use crate::domain::ledger::{CoinTransactionType, apply_delta};
use crate::error::LedgerError;

/// Lock the user's row, apply `delta` and append the matching ledger entry.
///
/// Returns the new balance.
pub async fn post_entry(
    conn: &mut PgConnection,
    user_id: UserId,
    delta: i64,
    transaction_type: CoinTransactionType,
) -> Result<i64, LedgerError> {
    let balance = sqlx::query_scalar::<_, i64>(
        "SELECT coin_balance FROM users WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(LedgerError::UserNotFound)?;

    let next = apply_delta(balance, delta)?;

    sqlx::query("UPDATE users SET coin_balance = $2 WHERE user_id = $1")
        .bind(user_id.as_uuid())
        .bind(next)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO coin_transactions (
            coin_transaction_id,
            user_id,
            amount,
            transaction_type
        ) VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(CoinTransactionId::new().as_uuid())
    .bind(user_id.as_uuid())
    .bind(delta)
    .bind(transaction_type.as_str())
    .execute(&mut *conn)
    .await?;

    tracing::info!(
        user_id = %user_id,
        delta,
        balance = next,
        transaction_type = %transaction_type,
        "Ledger entry posted"
    );

    Ok(next)
}
