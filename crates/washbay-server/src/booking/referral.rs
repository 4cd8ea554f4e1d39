//! Referral redemption and manual wallet adjustments.

use tracing::info;
use washbay_core::db::unix_timestamp;

use crate::storage::User;

use super::coordinator::BookingCoordinator;
use super::error::BookingError;
use super::ledger::apply_wallet_delta;

/// What a successful referral redemption credited.
#[derive(Debug, Clone, Copy)]
pub struct ReferralOutcome {
    pub referrer_bonus: i64,
    pub redeemer_bonus: i64,
    /// The redeemer's balance after the bonus.
    pub new_balance: i64,
}

impl BookingCoordinator {
    /// Redeem a referral code, crediting both sides atomically.
    ///
    /// A user can redeem at most one code, ever; the guard is re-checked on a
    /// fresh read inside the transaction so two racing redemptions cannot
    /// both land.
    pub async fn apply_referral_code(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<ReferralOutcome, BookingError> {
        let mut tx = self.db.pool().begin().await?;

        let redeemer = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| BookingError::UserNotFound(user_id.to_string()))?;
        if redeemer.used_referral_code.is_some() {
            return Err(BookingError::ReferralAlreadyRedeemed);
        }

        let owner = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE referral_code = ? AND referral_code <> ''",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| BookingError::InvalidReferralCode(code.to_string()))?;
        if owner.id == redeemer.id {
            return Err(BookingError::SelfReferral);
        }

        let referrer_bonus = self.config.referrer_bonus;
        let redeemer_bonus = self.config.redeemer_bonus;

        if referrer_bonus != 0 {
            apply_wallet_delta(&mut tx, &owner.id, referrer_bonus, "referral bonus", None, None)
                .await?;
        }
        let new_balance = if redeemer_bonus != 0 {
            apply_wallet_delta(
                &mut tx,
                &redeemer.id,
                redeemer_bonus,
                "referral welcome bonus",
                None,
                None,
            )
            .await?
        } else {
            redeemer.coins
        };

        let now = unix_timestamp();
        sqlx::query(
            "UPDATE users SET referral_count = referral_count + 1, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(&owner.id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE users SET used_referral_code = ?, updated_at = ? WHERE id = ?")
            .bind(code)
            .bind(now)
            .bind(&redeemer.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user_id, referrer_id = %owner.id, "Referral code redeemed");

        Ok(ReferralOutcome {
            referrer_bonus,
            redeemer_bonus,
            new_balance,
        })
    }

    /// Manually credit or debit a wallet (admin moderation).
    ///
    /// A negative delta may never take the balance below zero.
    pub async fn adjust_coins(
        &self,
        user_id: &str,
        delta: i64,
        description: &str,
    ) -> Result<i64, BookingError> {
        if delta == 0 {
            return Err(BookingError::InvalidRequest(
                "zero adjustment".to_string(),
            ));
        }

        let mut tx = self.db.pool().begin().await?;
        let new_balance =
            apply_wallet_delta(&mut tx, user_id, delta, description, None, None).await?;
        tx.commit().await?;

        info!(user_id, delta, new_balance, "Manual wallet adjustment applied");

        Ok(new_balance)
    }
}
