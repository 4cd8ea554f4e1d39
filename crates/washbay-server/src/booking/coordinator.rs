//! Appointment creation and lifecycle transitions.

use sqlx::{Sqlite, Transaction};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;
use washbay_core::config::BookingConfig;
use washbay_core::db::unix_timestamp;

use crate::notify::BookingEvent;
use crate::storage::{Appointment, MarketDatabase, Service};

use super::error::BookingError;
use super::ledger::apply_wallet_delta;
use super::status::AppointmentStatus;

/// Fields for a new booking.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub vendor_id: String,
    pub service_id: String,
    /// `None` books as a guest; guests cannot spend or earn coins.
    pub customer_id: Option<String>,
    pub starts_at: i64,
    pub duration_minutes: i64,
    pub total_price_cents: i64,
    pub coins_to_use: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub initial_status: AppointmentStatus,
}

/// Partial appointment update.
///
/// `None` keeps the stored value. For the nullable `notes` column the outer
/// `Option` controls whether to touch the column and the inner `Option`
/// distinguishes "set to value" from "clear (set to NULL)".
#[derive(Debug, Clone, Default)]
pub struct AppointmentUpdate {
    pub status: Option<AppointmentStatus>,
    pub starts_at: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<Option<String>>,
}

/// Coordinates bookings, status transitions, and every wallet mutation.
#[derive(Clone)]
pub struct BookingCoordinator {
    pub(super) db: MarketDatabase,
    pub(super) config: BookingConfig,
    pub(super) events: mpsc::UnboundedSender<BookingEvent>,
}

impl BookingCoordinator {
    pub fn new(
        db: MarketDatabase,
        config: BookingConfig,
        events: mpsc::UnboundedSender<BookingEvent>,
    ) -> Self {
        Self { db, config, events }
    }

    /// Emit a post-commit domain event. Delivery is best-effort; a closed
    /// channel is logged and otherwise ignored so notification problems can
    /// never be mistaken for booking failures.
    pub(super) fn emit(&self, event: BookingEvent) {
        if self.events.send(event).is_err() {
            warn!("Notification channel closed; event dropped");
        }
    }

    /// Create an appointment, atomically redeeming coins when requested.
    ///
    /// With `coins_to_use > 0` the debit transaction row, the balance update,
    /// and the appointment insert commit together or not at all.
    pub async fn create_appointment(
        &self,
        new: NewAppointment,
    ) -> Result<Appointment, BookingError> {
        if !matches!(
            new.initial_status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        ) {
            return Err(BookingError::InvalidRequest(
                "a new appointment must start as pending or confirmed".to_string(),
            ));
        }
        if new.coins_to_use < 0 {
            return Err(BookingError::InvalidRequest(
                "coins_to_use must not be negative".to_string(),
            ));
        }

        // Fail fast before opening a transaction.
        let vendor = self
            .db
            .find_vendor(&new.vendor_id)
            .await?
            .filter(|v| v.banned == 0)
            .ok_or_else(|| BookingError::VendorUnavailable(new.vendor_id.clone()))?;
        let service = self
            .db
            .find_service(&new.service_id)
            .await?
            .filter(|s| s.vendor_id == vendor.id)
            .ok_or_else(|| BookingError::ServiceNotFound(new.service_id.clone()))?;

        let id = Uuid::new_v4().to_string();

        if new.coins_to_use > 0 {
            let customer_id = new
                .customer_id
                .clone()
                .ok_or_else(|| BookingError::CustomerNotFound("<guest>".to_string()))?;

            let mut tx = self.db.pool().begin().await?;
            apply_wallet_delta(
                &mut tx,
                &customer_id,
                -new.coins_to_use,
                "coins used for discount",
                Some(&service.id),
                Some(&id),
            )
            .await
            .map_err(|e| match e {
                BookingError::UserNotFound(user) => BookingError::CustomerNotFound(user),
                other => other,
            })?;
            insert_appointment(&mut *tx, &id, &new).await?;
            tx.commit().await?;
        } else {
            insert_appointment(self.db.pool(), &id, &new).await?;
        }

        let appointment = self.db.get_appointment(&id).await?;
        info!(
            appointment_id = %appointment.id,
            vendor_id = %appointment.vendor_id,
            coins_used = appointment.coins_used,
            "Appointment created"
        );

        self.emit(BookingEvent::AppointmentCreated {
            appointment_id: appointment.id.clone(),
            vendor_id: appointment.vendor_id.clone(),
            customer_id: appointment.customer_id.clone(),
            starts_at: appointment.starts_at,
        });

        Ok(appointment)
    }

    /// Apply a partial update, crediting the completion reward exactly once.
    ///
    /// Reward eligibility is derived from a fresh in-transaction read
    /// (`status != completed && !coin_reward_processed`), never from the
    /// caller's view of the row, so duplicate or racing completion calls
    /// cannot double-credit.
    pub async fn update_appointment(
        &self,
        id: &str,
        update: AppointmentUpdate,
    ) -> Result<Appointment, BookingError> {
        let mut tx = self.db.pool().begin().await?;

        let existing = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| BookingError::AppointmentNotFound(id.to_string()))?;

        let to_completed = update.status == Some(AppointmentStatus::Completed)
            && existing.status != AppointmentStatus::Completed.as_str();
        let eligible = to_completed && existing.coin_reward_processed == 0;

        let mut reward_stamp: Option<(bool, i64)> = None;
        let mut credited = 0i64;

        if eligible {
            match existing.customer_id.as_deref() {
                None => {
                    // Guest booking (or account since deleted): the status
                    // change still applies, the wallet is left alone.
                    warn!(
                        appointment_id = %id,
                        "Completed appointment has no customer on record; skipping coin reward"
                    );
                }
                Some(customer_id) => {
                    let service =
                        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = ?")
                            .bind(&existing.service_id)
                            .fetch_optional(&mut *tx)
                            .await?
                            .ok_or_else(|| {
                                BookingError::ServiceNotFound(existing.service_id.clone())
                            })?;

                    if service.coin_reward > 0 {
                        credited = service.coin_reward;
                        apply_wallet_delta(
                            &mut tx,
                            customer_id,
                            service.coin_reward,
                            "coin reward for completed appointment",
                            Some(&service.id),
                            Some(id),
                        )
                        .await?;
                    } else {
                        // No reward configured; the customer must still exist.
                        let balance: Option<i64> =
                            sqlx::query_scalar("SELECT coins FROM users WHERE id = ?")
                                .bind(customer_id)
                                .fetch_optional(&mut *tx)
                                .await?;
                        if balance.is_none() {
                            return Err(BookingError::UserNotFound(customer_id.to_string()));
                        }
                    }

                    reward_stamp = Some((true, service.coin_reward));
                }
            }
        }

        apply_appointment_update(&mut tx, &existing, &update, reward_stamp).await?;
        tx.commit().await?;

        let updated = self.db.get_appointment(id).await?;

        if to_completed {
            info!(
                appointment_id = %id,
                coin_reward = credited,
                "Appointment completed"
            );
            self.emit(BookingEvent::AppointmentCompleted {
                appointment_id: updated.id.clone(),
                vendor_id: updated.vendor_id.clone(),
                customer_id: updated.customer_id.clone(),
                coin_reward: credited,
            });
        } else if let Some(new_status) = update.status {
            if new_status.as_str() != existing.status {
                self.emit(BookingEvent::AppointmentStatusChanged {
                    appointment_id: updated.id.clone(),
                    vendor_id: updated.vendor_id.clone(),
                    customer_id: updated.customer_id.clone(),
                    from: existing.status.clone(),
                    to: new_status.as_str().to_string(),
                });
            }
        }

        Ok(updated)
    }
}

/// Insert the appointment row. Runs on the pool for plain bookings and
/// inside the coin-debit transaction when coins are redeemed.
async fn insert_appointment<'e, E>(
    executor: E,
    id: &str,
    new: &NewAppointment,
) -> Result<(), BookingError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = unix_timestamp();

    sqlx::query(
        "INSERT INTO appointments \
         (id, vendor_id, service_id, customer_id, starts_at, duration_minutes, \
          total_price_cents, coins_used, status, customer_name, customer_phone, \
          notes, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&new.vendor_id)
    .bind(&new.service_id)
    .bind(new.customer_id.as_deref())
    .bind(new.starts_at)
    .bind(new.duration_minutes)
    .bind(new.total_price_cents)
    .bind(new.coins_to_use)
    .bind(new.initial_status.as_str())
    .bind(&new.customer_name)
    .bind(&new.customer_phone)
    .bind(new.notes.as_deref())
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}

/// Merge the partial update onto the freshly-read row and write it back,
/// optionally stamping the reward fields in the same statement.
async fn apply_appointment_update(
    tx: &mut Transaction<'_, Sqlite>,
    existing: &Appointment,
    update: &AppointmentUpdate,
    reward_stamp: Option<(bool, i64)>,
) -> Result<(), BookingError> {
    let final_status: &str = match update.status {
        Some(s) => s.as_str(),
        None => existing.status.as_str(),
    };
    let final_starts_at = update.starts_at.unwrap_or(existing.starts_at);
    let final_duration = update.duration_minutes.unwrap_or(existing.duration_minutes);
    let final_name = update
        .customer_name
        .as_deref()
        .unwrap_or(&existing.customer_name);
    let final_phone = update
        .customer_phone
        .as_deref()
        .unwrap_or(&existing.customer_phone);
    let final_notes: Option<&str> = match &update.notes {
        Some(v) => v.as_deref(),
        None => existing.notes.as_deref(),
    };
    let (final_processed, final_amount) = reward_stamp.map_or(
        (
            existing.coin_reward_processed,
            existing.coin_reward_amount,
        ),
        |(processed, amount)| (i64::from(processed), amount),
    );
    let now = unix_timestamp();

    sqlx::query(
        "UPDATE appointments SET status = ?, starts_at = ?, duration_minutes = ?, \
         customer_name = ?, customer_phone = ?, notes = ?, \
         coin_reward_processed = ?, coin_reward_amount = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(final_status)
    .bind(final_starts_at)
    .bind(final_duration)
    .bind(final_name)
    .bind(final_phone)
    .bind(final_notes)
    .bind(final_processed)
    .bind(final_amount)
    .bind(now)
    .bind(&existing.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
