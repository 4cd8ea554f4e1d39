//! Vendor directory and service catalogue queries.

use washbay_core::db::{DatabaseError, unix_timestamp};

use super::db::MarketDatabase;
use super::models::{Service, Vendor};

/// Parameters for creating a catalogue service.
pub struct ServiceParams<'a> {
    pub id: &'a str,
    pub vendor_id: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price_cents: i64,
    pub duration_minutes: i64,
    pub coin_reward: i64,
    pub available: bool,
}

impl MarketDatabase {
    // =========================================================================
    // Vendor queries
    // =========================================================================

    /// Register a vendor.
    pub async fn create_vendor(
        &self,
        id: &str,
        user_id: &str,
        name: &str,
        city: &str,
    ) -> Result<Vendor, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO vendors (id, user_id, name, city, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(city)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_vendor(id).await
    }

    /// Get a vendor by ID.
    pub async fn get_vendor(&self, id: &str) -> Result<Vendor, DatabaseError> {
        sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Vendor {id}")))
    }

    /// Get a vendor by ID, `None` when missing.
    pub async fn find_vendor(&self, id: &str) -> Result<Option<Vendor>, DatabaseError> {
        let vendor = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(vendor)
    }

    /// List vendors for the directory.
    ///
    /// Banned vendors are excluded unless `include_banned` is set (admin
    /// moderation views).
    pub async fn list_vendors(
        &self,
        include_banned: bool,
        only_verified: bool,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Vendor>, DatabaseError> {
        let vendors = sqlx::query_as::<_, Vendor>(
            "SELECT * FROM vendors \
             WHERE (banned = 0 OR ?) AND (verified = 1 OR NOT ?) \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(include_banned)
        .bind(only_verified)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        Ok(vendors)
    }

    /// Count vendors matching the directory filters.
    pub async fn count_vendors(
        &self,
        include_banned: bool,
        only_verified: bool,
    ) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM vendors WHERE (banned = 0 OR ?) AND (verified = 1 OR NOT ?)",
        )
        .bind(include_banned)
        .bind(only_verified)
        .fetch_one(self.pool())
        .await?;

        Ok(row.0)
    }

    /// Ban or unban a vendor (moderation).
    pub async fn set_vendor_banned(
        &self,
        id: &str,
        banned: bool,
    ) -> Result<Vendor, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query("UPDATE vendors SET banned = ?, updated_at = ? WHERE id = ?")
            .bind(banned)
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Vendor {id}")));
        }

        self.get_vendor(id).await
    }

    /// Mark a vendor verified or unverified (moderation).
    pub async fn set_vendor_verified(
        &self,
        id: &str,
        verified: bool,
    ) -> Result<Vendor, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query("UPDATE vendors SET verified = ?, updated_at = ? WHERE id = ?")
            .bind(verified)
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Vendor {id}")));
        }

        self.get_vendor(id).await
    }

    // =========================================================================
    // Service catalogue queries
    // =========================================================================

    /// Create a catalogue service for a vendor.
    pub async fn create_service(&self, params: &ServiceParams<'_>) -> Result<Service, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO services (id, vendor_id, name, description, price_cents, \
             duration_minutes, coin_reward, available, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.id)
        .bind(params.vendor_id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.price_cents)
        .bind(params.duration_minutes)
        .bind(params.coin_reward)
        .bind(params.available)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_service(params.id).await
    }

    /// Get a service by ID.
    pub async fn get_service(&self, id: &str) -> Result<Service, DatabaseError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Service {id}")))
    }

    /// Get a service by ID, `None` when missing.
    pub async fn find_service(&self, id: &str) -> Result<Option<Service>, DatabaseError> {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(service)
    }

    /// Atomically fetch-then-update a service inside a single transaction.
    ///
    /// Only the fields that are `Some(…)` are changed; `None` means "keep the
    /// existing value". For the nullable `description` column the outer
    /// `Option` controls whether to touch the column and the inner `Option`
    /// distinguishes "set to value" from "clear (set to NULL)".
    #[allow(clippy::too_many_arguments)]
    pub async fn update_service_partial(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<Option<&str>>,
        price_cents: Option<i64>,
        duration_minutes: Option<i64>,
        coin_reward: Option<i64>,
        available: Option<bool>,
    ) -> Result<Service, DatabaseError> {
        let mut tx = self.pool().begin().await?;

        // Fetch existing row inside the transaction.
        let existing = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Service {id}")))?;

        let final_name = name.unwrap_or(&existing.name);
        let final_desc: Option<&str> = match description {
            Some(v) => v,
            None => existing.description.as_deref(),
        };
        let final_price = price_cents.unwrap_or(existing.price_cents);
        let final_duration = duration_minutes.unwrap_or(existing.duration_minutes);
        let final_reward = coin_reward.unwrap_or(existing.coin_reward);
        let final_available = available.unwrap_or(existing.available != 0);
        let now = unix_timestamp();

        sqlx::query(
            "UPDATE services SET name = ?, description = ?, price_cents = ?, \
             duration_minutes = ?, coin_reward = ?, available = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(final_name)
        .bind(final_desc)
        .bind(final_price)
        .bind(final_duration)
        .bind(final_reward)
        .bind(final_available)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// List a vendor's services, optionally only the bookable ones.
    pub async fn list_services(
        &self,
        vendor_id: &str,
        only_available: bool,
    ) -> Result<Vec<Service>, DatabaseError> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE vendor_id = ? AND (available = 1 OR NOT ?) \
             ORDER BY created_at ASC",
        )
        .bind(vendor_id)
        .bind(only_available)
        .fetch_all(self.pool())
        .await?;

        Ok(services)
    }
}
