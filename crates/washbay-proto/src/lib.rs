//! Washbay Protocol Buffers
//!
//! Generated protobuf code for the Washbay gRPC API.
//!
//! This crate contains:
//! - `UserService` for account profiles
//! - `VendorService` for the vendor directory, moderation, and catalogues
//! - `BookingService` for the appointment lifecycle
//! - `WalletService` for coin balances, referrals, and adjustments

#![allow(clippy::derive_partial_eq_without_eq)]

/// Washbay v1 API definitions.
///
/// All generated types and services are included here.
pub mod v1 {
    tonic::include_proto!("washbay.v1");
}

// Re-export v1 as the default API version for convenience
pub use v1::*;

// Re-export prost_types for downstream crates that need Timestamp conversion
pub use prost_types;
