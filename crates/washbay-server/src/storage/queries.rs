//! User and wallet queries for the Washbay marketplace server.

use washbay_core::db::{DatabaseError, unix_timestamp};

use super::db::MarketDatabase;
use super::models::{User, WalletTransaction};

impl MarketDatabase {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a new user with an empty wallet.
    pub async fn create_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        role: &str,
        referral_code: &str,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (id, name, email, role, referral_code, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(referral_code)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(id).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Look up the owner of a referral code.
    pub async fn get_user_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<User>, DatabaseError> {
        if code.is_empty() {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE referral_code = ?")
            .bind(code)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Check whether a referral code is already taken (used at registration).
    pub async fn referral_code_exists(&self, code: &str) -> Result<bool, DatabaseError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE referral_code = ?")
                .bind(code)
                .fetch_one(self.pool())
                .await?;

        Ok(row.0 > 0)
    }

    // =========================================================================
    // Wallet queries
    // =========================================================================

    /// List a user's wallet transactions, newest first.
    pub async fn list_wallet_transactions(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<WalletTransaction>, DatabaseError> {
        let transactions = sqlx::query_as::<_, WalletTransaction>(
            "SELECT * FROM wallet_transactions WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        Ok(transactions)
    }

    /// Count a user's wallet transactions.
    pub async fn count_wallet_transactions(&self, user_id: &str) -> Result<i64, DatabaseError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM wallet_transactions WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(self.pool())
                .await?;

        Ok(row.0)
    }

    /// Sum of all transaction amounts for a user.
    ///
    /// Always equals `users.coins` for a healthy database; exposed so the
    /// invariant is checkable from tests and admin tooling.
    pub async fn wallet_transaction_sum(&self, user_id: &str) -> Result<i64, DatabaseError> {
        let row: (Option<i64>,) = sqlx::query_as(
            "SELECT SUM(amount) FROM wallet_transactions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;

        Ok(row.0.unwrap_or(0))
    }
}
