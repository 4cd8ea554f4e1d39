//! The single write path for wallet state.
//!
//! Every coin mutation (booking debit, completion reward, referral bonuses,
//! admin adjustment) calls `apply_wallet_delta` inside the transaction that
//! carries the business fact, so the balance and the transaction log can
//! never drift apart.

use sqlx::{Sqlite, Transaction};
use uuid::Uuid;
use washbay_core::db::unix_timestamp;

use super::error::BookingError;

/// Apply a signed coin delta to a user's wallet inside the caller's
/// transaction: appends one `wallet_transactions` row and updates the
/// balance.
///
/// Fails with `UserNotFound` when the user row is missing and with
/// `InsufficientCoins` when the delta would take the balance below zero,
/// in both cases before any write.
pub(crate) async fn apply_wallet_delta(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
    delta: i64,
    description: &str,
    service_id: Option<&str>,
    appointment_id: Option<&str>,
) -> Result<i64, BookingError> {
    if delta == 0 {
        return Err(BookingError::InvalidRequest(
            "zero wallet delta".to_string(),
        ));
    }

    let balance: Option<i64> = sqlx::query_scalar("SELECT coins FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    let balance = balance.ok_or_else(|| BookingError::UserNotFound(user_id.to_string()))?;

    let new_balance = balance + delta;
    if new_balance < 0 {
        return Err(BookingError::InsufficientCoins {
            have: balance,
            need: -delta,
        });
    }

    let kind = if delta > 0 { "credit" } else { "debit" };
    let now = unix_timestamp();

    sqlx::query(
        "INSERT INTO wallet_transactions \
         (id, user_id, amount, kind, description, service_id, appointment_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(delta)
    .bind(kind)
    .bind(description)
    .bind(service_id)
    .bind(appointment_id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    sqlx::query("UPDATE users SET coins = ?, updated_at = ? WHERE id = ?")
        .bind(new_balance)
        .bind(now)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    Ok(new_balance)
}
