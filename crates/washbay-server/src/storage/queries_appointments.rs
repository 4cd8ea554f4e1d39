//! Appointment read queries.
//!
//! Appointment writes go through the booking coordinator so that status
//! changes and wallet effects always share one transaction; this file only
//! holds the lookup side.

use washbay_core::db::DatabaseError;

use super::db::MarketDatabase;
use super::models::Appointment;

impl MarketDatabase {
    /// Get an appointment by ID.
    pub async fn get_appointment(&self, id: &str) -> Result<Appointment, DatabaseError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Appointment {id}")))
    }

    /// Get an appointment by ID, `None` when missing.
    pub async fn find_appointment(&self, id: &str) -> Result<Option<Appointment>, DatabaseError> {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        Ok(appointment)
    }

    /// List a vendor's appointments, soonest first.
    pub async fn list_vendor_appointments(
        &self,
        vendor_id: &str,
        status_filter: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let appointments = if let Some(status) = status_filter {
            sqlx::query_as::<_, Appointment>(
                "SELECT * FROM appointments WHERE vendor_id = ? AND status = ? \
                 ORDER BY starts_at ASC LIMIT ? OFFSET ?",
            )
            .bind(vendor_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Appointment>(
                "SELECT * FROM appointments WHERE vendor_id = ? \
                 ORDER BY starts_at ASC LIMIT ? OFFSET ?",
            )
            .bind(vendor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        };

        Ok(appointments)
    }

    /// List a customer's appointments, soonest first.
    pub async fn list_customer_appointments(
        &self,
        customer_id: &str,
        status_filter: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let appointments = if let Some(status) = status_filter {
            sqlx::query_as::<_, Appointment>(
                "SELECT * FROM appointments WHERE customer_id = ? AND status = ? \
                 ORDER BY starts_at ASC LIMIT ? OFFSET ?",
            )
            .bind(customer_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Appointment>(
                "SELECT * FROM appointments WHERE customer_id = ? \
                 ORDER BY starts_at ASC LIMIT ? OFFSET ?",
            )
            .bind(customer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        };

        Ok(appointments)
    }

    /// Count a vendor's appointments matching the filter.
    pub async fn count_vendor_appointments(
        &self,
        vendor_id: &str,
        status_filter: Option<&str>,
    ) -> Result<i64, DatabaseError> {
        let row: (i64,) = if let Some(status) = status_filter {
            sqlx::query_as(
                "SELECT COUNT(*) FROM appointments WHERE vendor_id = ? AND status = ?",
            )
            .bind(vendor_id)
            .bind(status)
            .fetch_one(self.pool())
            .await?
        } else {
            sqlx::query_as("SELECT COUNT(*) FROM appointments WHERE vendor_id = ?")
                .bind(vendor_id)
                .fetch_one(self.pool())
                .await?
        };

        Ok(row.0)
    }

    /// Count a customer's appointments matching the filter.
    pub async fn count_customer_appointments(
        &self,
        customer_id: &str,
        status_filter: Option<&str>,
    ) -> Result<i64, DatabaseError> {
        let row: (i64,) = if let Some(status) = status_filter {
            sqlx::query_as(
                "SELECT COUNT(*) FROM appointments WHERE customer_id = ? AND status = ?",
            )
            .bind(customer_id)
            .bind(status)
            .fetch_one(self.pool())
            .await?
        } else {
            sqlx::query_as("SELECT COUNT(*) FROM appointments WHERE customer_id = ?")
                .bind(customer_id)
                .fetch_one(self.pool())
                .await?
        };

        Ok(row.0)
    }
}
