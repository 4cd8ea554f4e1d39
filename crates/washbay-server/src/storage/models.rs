//! Data models for Washbay marketplace storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub coins: i64,
    pub referral_code: String,
    pub used_referral_code: Option<String>,
    pub referral_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Append-only ledger row; credits carry a positive amount, debits negative.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WalletTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub kind: String,
    pub description: String,
    pub service_id: Option<String>,
    pub appointment_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vendor {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub city: String,
    pub banned: i64,
    pub verified: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: i64,
    pub coin_reward: i64,
    pub available: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: String,
    pub vendor_id: String,
    pub service_id: String,
    /// `None` for guest bookings taken over the phone.
    pub customer_id: Option<String>,
    pub starts_at: i64,
    pub duration_minutes: i64,
    pub total_price_cents: i64,
    pub coins_used: i64,
    pub status: String,
    pub coin_reward_processed: i64,
    pub coin_reward_amount: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
