//! Shared fixtures for gRPC service tests.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use tokio::sync::mpsc;
use washbay_core::config::BookingConfig;

use crate::booking::BookingCoordinator;
use crate::storage::{MarketDatabase, ServiceParams};

pub(crate) async fn test_db() -> MarketDatabase {
    MarketDatabase::open_in_memory().await.unwrap()
}

/// Coordinator wired to a drained event channel (the dispatcher is not under
/// test here).
pub(crate) fn test_coordinator(db: &MarketDatabase) -> BookingCoordinator {
    let (tx, rx) = mpsc::unbounded_channel();
    // Keep the receiver alive in a drain task so emits do not log warnings.
    tokio::spawn(async move {
        let mut rx = rx;
        while rx.recv().await.is_some() {}
    });
    BookingCoordinator::new(db.clone(), BookingConfig::default(), tx)
}

/// Seed a customer account, funding it through the ledger.
pub(crate) async fn seed_customer(
    db: &MarketDatabase,
    coordinator: &BookingCoordinator,
    id: &str,
    coins: i64,
) {
    db.create_user(
        id,
        "Anna Asiakas",
        &format!("{id}@example.com"),
        "customer",
        &format!("WASH-{}", id.to_uppercase()),
    )
    .await
    .unwrap();
    if coins != 0 {
        coordinator
            .adjust_coins(id, coins, "starting balance")
            .await
            .unwrap();
    }
}

/// Seed a verified vendor ("v1") with one service ("s1").
pub(crate) async fn seed_vendor_with_service(db: &MarketDatabase, reward: i64) {
    db.create_user(
        "v1-owner",
        "Ville Vendor",
        "v1-owner@example.com",
        "vendor",
        "WASH-V1OWNER",
    )
    .await
    .unwrap();
    db.create_vendor("v1", "v1-owner", "Sparkle Wash", "Helsinki")
        .await
        .unwrap();
    db.set_vendor_verified("v1", true).await.unwrap();
    db.create_service(&ServiceParams {
        id: "s1",
        vendor_id: "v1",
        name: "Premium wash",
        description: None,
        price_cents: 5000,
        duration_minutes: 45,
        coin_reward: reward,
        available: true,
    })
    .await
    .unwrap();
}
