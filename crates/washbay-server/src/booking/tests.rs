//! Booking coordinator tests.
//!
//! These cover the ledger invariants: wallet conservation, exactly-once
//! reward crediting, and zero-side-effect failures.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use tokio::sync::mpsc;
use washbay_core::config::BookingConfig;

use crate::notify::BookingEvent;
use crate::storage::{MarketDatabase, ServiceParams};

use super::coordinator::{AppointmentUpdate, BookingCoordinator, NewAppointment};
use super::error::BookingError;
use super::status::AppointmentStatus;

struct Harness {
    db: MarketDatabase,
    coordinator: BookingCoordinator,
    events: mpsc::UnboundedReceiver<BookingEvent>,
}

async fn harness() -> Harness {
    let db = MarketDatabase::open_in_memory().await.unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let coordinator = BookingCoordinator::new(db.clone(), BookingConfig::default(), tx);
    Harness {
        db,
        coordinator,
        events: rx,
    }
}

impl Harness {
    /// Create a customer and fund the wallet through the ledger so the
    /// "balance = sum of transactions" invariant holds from the start.
    async fn seed_customer(&self, id: &str, coins: i64) {
        self.db
            .create_user(
                id,
                "Anna Asiakas",
                &format!("{id}@example.com"),
                "customer",
                &format!("WASH-{}", id.to_uppercase()),
            )
            .await
            .unwrap();
        if coins != 0 {
            self.coordinator
                .adjust_coins(id, coins, "starting balance")
                .await
                .unwrap();
        }
    }

    /// Create a vendor (with its owner account) and one service.
    async fn seed_vendor_with_service(&self, vendor_id: &str, service_id: &str, reward: i64) {
        let owner = format!("{vendor_id}-owner");
        self.db
            .create_user(
                &owner,
                "Ville Vendor",
                &format!("{owner}@example.com"),
                "vendor",
                &format!("WASH-{}", owner.to_uppercase()),
            )
            .await
            .unwrap();
        self.db
            .create_vendor(vendor_id, &owner, "Sparkle Wash", "Helsinki")
            .await
            .unwrap();
        self.db.set_vendor_verified(vendor_id, true).await.unwrap();
        self.db
            .create_service(&ServiceParams {
                id: service_id,
                vendor_id,
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

    fn booking(&self, customer: Option<&str>, coins: i64) -> NewAppointment {
        NewAppointment {
            vendor_id: "v1".to_string(),
            service_id: "s1".to_string(),
            customer_id: customer.map(str::to_string),
            starts_at: 1_760_000_000,
            duration_minutes: 45,
            total_price_cents: 5000,
            coins_to_use: coins,
            customer_name: "Anna Asiakas".to_string(),
            customer_phone: "+358401234567".to_string(),
            notes: None,
            initial_status: AppointmentStatus::Confirmed,
        }
    }

    async fn coins(&self, user_id: &str) -> i64 {
        self.db.get_user(user_id).await.unwrap().coins
    }

    async fn tx_count(&self, user_id: &str) -> i64 {
        self.db.count_wallet_transactions(user_id).await.unwrap()
    }

    /// The conservation invariant: balance equals the signed sum of the log.
    async fn assert_wallet_conserved(&self, user_id: &str) {
        let user = self.db.get_user(user_id).await.unwrap();
        let sum = self.db.wallet_transaction_sum(user_id).await.unwrap();
        assert_eq!(user.coins, sum, "wallet balance drifted from its ledger");
    }
}

// === Appointment creation ===

#[tokio::test]
async fn booking_without_coins_has_no_ledger_effect() {
    let mut h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 0).await;

    let appt = h.coordinator.create_appointment(h.booking(Some("u1"), 0)).await.unwrap();

    assert_eq!(appt.status, "confirmed");
    assert_eq!(appt.coins_used, 0);
    assert_eq!(appt.coin_reward_processed, 0);
    assert_eq!(h.tx_count("u1").await, 0);

    match h.events.recv().await.unwrap() {
        BookingEvent::AppointmentCreated { appointment_id, .. } => {
            assert_eq!(appointment_id, appt.id);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn booking_with_coins_debits_wallet_atomically() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 10).await;

    let appt = h.coordinator.create_appointment(h.booking(Some("u1"), 10)).await.unwrap();

    assert_eq!(appt.coins_used, 10);
    assert_eq!(h.coins("u1").await, 0);

    let transactions = h.db.list_wallet_transactions("u1", 100, 0).await.unwrap();
    // Newest first: the discount debit, then the seed credit.
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].amount, -10);
    assert_eq!(transactions[0].kind, "debit");
    assert_eq!(transactions[0].description, "coins used for discount");
    assert_eq!(transactions[0].appointment_id.as_deref(), Some(appt.id.as_str()));

    h.assert_wallet_conserved("u1").await;
}

#[tokio::test]
async fn insufficient_coins_blocks_booking_with_no_writes() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 5).await;

    let err = h
        .coordinator
        .create_appointment(h.booking(Some("u1"), 10))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::InsufficientCoins { have: 5, need: 10 }));
    assert_eq!(h.coins("u1").await, 5);
    assert_eq!(h.tx_count("u1").await, 1); // just the seed credit
    assert_eq!(h.db.count_vendor_appointments("v1", None).await.unwrap(), 0);
}

#[tokio::test]
async fn banned_vendor_blocks_booking() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 10).await;
    h.db.set_vendor_banned("v1", true).await.unwrap();

    let err = h
        .coordinator
        .create_appointment(h.booking(Some("u1"), 10))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::VendorUnavailable(_)));
    assert_eq!(h.coins("u1").await, 10);
    assert_eq!(h.db.count_vendor_appointments("v1", None).await.unwrap(), 0);
}

#[tokio::test]
async fn service_of_another_vendor_is_rejected() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_vendor_with_service("v2", "s2", 0).await;
    h.seed_customer("u1", 0).await;

    let mut booking = h.booking(Some("u1"), 0);
    booking.service_id = "s2".to_string();

    let err = h.coordinator.create_appointment(booking).await.unwrap_err();
    assert!(matches!(err, BookingError::ServiceNotFound(_)));
}

#[tokio::test]
async fn guest_cannot_spend_coins() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;

    let err = h
        .coordinator
        .create_appointment(h.booking(None, 5))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::CustomerNotFound(_)));
}

#[tokio::test]
async fn new_appointment_must_start_pending_or_confirmed() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 0).await;

    let mut booking = h.booking(Some("u1"), 0);
    booking.initial_status = AppointmentStatus::Completed;

    let err = h.coordinator.create_appointment(booking).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidRequest(_)));

    let mut booking = h.booking(Some("u1"), 0);
    booking.initial_status = AppointmentStatus::Pending;
    let appt = h.coordinator.create_appointment(booking).await.unwrap();
    assert_eq!(appt.status, "pending");
}

// === Completion & reward ===

#[tokio::test]
async fn full_booking_and_reward_scenario() {
    let mut h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 10).await;

    let appt = h.coordinator.create_appointment(h.booking(Some("u1"), 10)).await.unwrap();
    assert_eq!(h.coins("u1").await, 0);

    let completed = h
        .coordinator
        .update_appointment(
            &appt.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Completed),
                ..AppointmentUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(completed.status, "completed");
    assert_eq!(completed.coin_reward_processed, 1);
    assert_eq!(completed.coin_reward_amount, 20);
    assert_eq!(h.coins("u1").await, 20);

    let transactions = h.db.list_wallet_transactions("u1", 100, 0).await.unwrap();
    assert_eq!(transactions[0].amount, 20);
    assert_eq!(transactions[0].kind, "credit");
    assert_eq!(transactions[0].service_id.as_deref(), Some("s1"));
    assert_eq!(transactions[0].appointment_id.as_deref(), Some(appt.id.as_str()));

    h.assert_wallet_conserved("u1").await;

    // Created, then completed.
    assert!(matches!(
        h.events.recv().await.unwrap(),
        BookingEvent::AppointmentCreated { .. }
    ));
    match h.events.recv().await.unwrap() {
        BookingEvent::AppointmentCompleted { coin_reward, .. } => assert_eq!(coin_reward, 20),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn completing_twice_credits_once() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 0).await;

    let appt = h.coordinator.create_appointment(h.booking(Some("u1"), 0)).await.unwrap();
    let complete = AppointmentUpdate {
        status: Some(AppointmentStatus::Completed),
        ..AppointmentUpdate::default()
    };

    h.coordinator.update_appointment(&appt.id, complete.clone()).await.unwrap();
    h.coordinator.update_appointment(&appt.id, complete).await.unwrap();

    assert_eq!(h.coins("u1").await, 20);
    // Exactly one credit row despite two completion calls.
    assert_eq!(h.tx_count("u1").await, 1);
    h.assert_wallet_conserved("u1").await;
}

#[tokio::test]
async fn reward_does_not_fire_again_after_manual_correction() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 0).await;

    let appt = h.coordinator.create_appointment(h.booking(Some("u1"), 0)).await.unwrap();

    for status in [
        AppointmentStatus::Completed,
        AppointmentStatus::Confirmed, // staff undoes the completion by mistake
        AppointmentStatus::Completed, // and completes again
    ] {
        h.coordinator
            .update_appointment(
                &appt.id,
                AppointmentUpdate {
                    status: Some(status),
                    ..AppointmentUpdate::default()
                },
            )
            .await
            .unwrap();
    }

    let row = h.db.get_appointment(&appt.id).await.unwrap();
    assert_eq!(row.status, "completed");
    assert_eq!(row.coin_reward_processed, 1);
    assert_eq!(h.coins("u1").await, 20);
    assert_eq!(h.tx_count("u1").await, 1);
}

#[tokio::test]
async fn zero_reward_completion_sets_flag_without_transaction() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 0).await;
    h.seed_customer("u1", 0).await;

    let appt = h.coordinator.create_appointment(h.booking(Some("u1"), 0)).await.unwrap();
    let completed = h
        .coordinator
        .update_appointment(
            &appt.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Completed),
                ..AppointmentUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(completed.coin_reward_processed, 1);
    assert_eq!(completed.coin_reward_amount, 0);
    assert_eq!(h.tx_count("u1").await, 0);
    assert_eq!(h.coins("u1").await, 0);
}

#[tokio::test]
async fn guest_completion_skips_reward_but_applies_status() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;

    let appt = h.coordinator.create_appointment(h.booking(None, 0)).await.unwrap();
    let completed = h
        .coordinator
        .update_appointment(
            &appt.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Completed),
                ..AppointmentUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(completed.status, "completed");
    assert_eq!(completed.coin_reward_processed, 0);
    assert_eq!(completed.coin_reward_amount, 0);
}

#[tokio::test]
async fn partial_update_leaves_ledger_untouched() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 0).await;

    let appt = h.coordinator.create_appointment(h.booking(Some("u1"), 0)).await.unwrap();
    let updated = h
        .coordinator
        .update_appointment(
            &appt.id,
            AppointmentUpdate {
                starts_at: Some(1_760_003_600),
                notes: Some(Some("gate code 4321".to_string())),
                ..AppointmentUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, "confirmed");
    assert_eq!(updated.starts_at, 1_760_003_600);
    assert_eq!(updated.notes.as_deref(), Some("gate code 4321"));
    assert_eq!(h.tx_count("u1").await, 0);

    // And the nested Option clears the column again.
    let cleared = h
        .coordinator
        .update_appointment(
            &appt.id,
            AppointmentUpdate {
                notes: Some(None),
                ..AppointmentUpdate::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.notes.is_none());
}

#[tokio::test]
async fn updating_missing_appointment_is_not_found() {
    let h = harness().await;

    let err = h
        .coordinator
        .update_appointment("ghost", AppointmentUpdate::default())
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::AppointmentNotFound(_)));
}

// === Referral programme ===

#[tokio::test]
async fn referral_credits_both_sides_atomically() {
    let h = harness().await;
    h.seed_customer("referrer", 0).await;
    h.seed_customer("friend", 0).await;

    let outcome = h
        .coordinator
        .apply_referral_code("friend", "WASH-REFERRER")
        .await
        .unwrap();

    assert_eq!(outcome.referrer_bonus, 50);
    assert_eq!(outcome.redeemer_bonus, 25);
    assert_eq!(outcome.new_balance, 25);
    assert_eq!(h.coins("referrer").await, 50);
    assert_eq!(h.coins("friend").await, 25);

    let referrer = h.db.get_user("referrer").await.unwrap();
    assert_eq!(referrer.referral_count, 1);
    let friend = h.db.get_user("friend").await.unwrap();
    assert_eq!(friend.used_referral_code.as_deref(), Some("WASH-REFERRER"));

    h.assert_wallet_conserved("referrer").await;
    h.assert_wallet_conserved("friend").await;
}

#[tokio::test]
async fn self_referral_is_rejected_with_no_writes() {
    let h = harness().await;
    h.seed_customer("u1", 0).await;

    let err = h
        .coordinator
        .apply_referral_code("u1", "WASH-U1")
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::SelfReferral));
    assert_eq!(h.coins("u1").await, 0);
    assert_eq!(h.tx_count("u1").await, 0);
    assert_eq!(h.db.get_user("u1").await.unwrap().referral_count, 0);
}

#[tokio::test]
async fn referral_code_can_be_redeemed_only_once_per_account() {
    let h = harness().await;
    h.seed_customer("referrer", 0).await;
    h.seed_customer("other", 0).await;
    h.seed_customer("friend", 0).await;

    h.coordinator
        .apply_referral_code("friend", "WASH-REFERRER")
        .await
        .unwrap();

    let err = h
        .coordinator
        .apply_referral_code("friend", "WASH-OTHER")
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::ReferralAlreadyRedeemed));
    assert_eq!(h.coins("other").await, 0);
    assert_eq!(h.coins("friend").await, 25);
}

#[tokio::test]
async fn unknown_referral_code_is_rejected() {
    let h = harness().await;
    h.seed_customer("u1", 0).await;

    let err = h
        .coordinator
        .apply_referral_code("u1", "WASH-NOPE")
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::InvalidReferralCode(_)));
}

// === Admin adjustments ===

#[tokio::test]
async fn adjustment_cannot_overdraw_the_wallet() {
    let h = harness().await;
    h.seed_customer("u1", 3).await;

    let err = h
        .coordinator
        .adjust_coins("u1", -5, "correction")
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::InsufficientCoins { have: 3, need: 5 }));
    assert_eq!(h.coins("u1").await, 3);
}

#[tokio::test]
async fn zero_adjustment_is_rejected() {
    let h = harness().await;
    h.seed_customer("u1", 0).await;

    let err = h.coordinator.adjust_coins("u1", 0, "noop").await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidRequest(_)));
}

// === Conservation across mixed flows ===

#[tokio::test]
async fn wallet_conservation_across_mixed_operations() {
    let h = harness().await;
    h.seed_vendor_with_service("v1", "s1", 20).await;
    h.seed_customer("u1", 30).await;
    h.seed_customer("u2", 0).await;

    let appt = h.coordinator.create_appointment(h.booking(Some("u1"), 10)).await.unwrap();
    h.coordinator
        .update_appointment(
            &appt.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Completed),
                ..AppointmentUpdate::default()
            },
        )
        .await
        .unwrap();
    h.coordinator.apply_referral_code("u2", "WASH-U1").await.unwrap();
    h.coordinator.adjust_coins("u1", -5, "goodwill reversal").await.unwrap();

    // 30 - 10 + 20 + 50 - 5
    assert_eq!(h.coins("u1").await, 85);
    assert_eq!(h.coins("u2").await, 25);
    h.assert_wallet_conserved("u1").await;
    h.assert_wallet_conserved("u2").await;
}
