//! Washbay Marketplace Server Library
//!
//! Core functionality for the Washbay backend:
//! - SQLite storage for users, wallets, vendors, services, and appointments
//! - Booking coordinator: atomic coin redemption, exactly-once completion
//!   rewards, referral bonuses, admin wallet adjustments
//! - Post-commit notification dispatch (log or webhook sink)
//! - gRPC services (User, Vendor, Booking, Wallet, Health)

pub mod booking;
pub mod notify;
pub mod server;
pub mod storage;
