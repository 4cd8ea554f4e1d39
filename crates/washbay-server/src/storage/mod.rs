//! SQLite storage for the Washbay marketplace server.
//!
//! Provides persistence for users, coin wallets, vendors, services, and
//! appointments. All multi-step wallet mutations live in the booking
//! coordinator; this layer holds the single-statement queries.

mod db;
mod models;
mod queries;
mod queries_appointments;
mod queries_vendors;


pub use db::MarketDatabase;
pub use models::*;
pub use queries_vendors::ServiceParams;
pub use washbay_core::db::DatabaseError;
