//! gRPC server implementations for the Washbay marketplace.

pub mod booking_svc;
pub mod grpc_util;
pub mod health;
pub mod user_svc;
pub mod vendor_svc;
pub mod wallet_svc;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use booking_svc::BookingServiceImpl;
pub use health::MarketHealthService;
pub use user_svc::UserServiceImpl;
pub use vendor_svc::VendorServiceImpl;
pub use wallet_svc::WalletServiceImpl;
