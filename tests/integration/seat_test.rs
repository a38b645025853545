//! Integration tests for seat allocation and release.

mod helpers;

use std::sync::Arc;

use futures::future::join_all;

use helpers::{MACHINE_A, TestApp, seat};
use licensehub_core::types::{LicenseId, SeatId};
use licensehub_database::EntitlementStore;
use licensehub_entity::license::LicensePlan;
use licensehub_entity::seat::SeatRole;
use licensehub_service::{NewSeatRequest, SeatError, UnusableReason};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_never_exceed_limit() {
    let app = Arc::new(TestApp::new());
    let (_, license_id) = app.issue_active(LicensePlan::Business, 5).await;

    let attempts = (0..12).map(|i| {
        let coordinator = app.services.coordinator.clone();
        tokio::spawn(async move {
            coordinator
                .allocate_seat(license_id, seat(&format!("clerk{i}@shop.io")))
                .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let granted = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(SeatError::SeatLimitReached { used: 5, limit: 5 })))
        .count();

    assert_eq!(granted, 5);
    assert_eq!(refused, 7);
    assert_eq!(app.store.count_seats(license_id).await.unwrap(), 5);
}

#[tokio::test]
async fn test_duplicate_email_is_case_insensitive() {
    let app = TestApp::new();
    let (_, license_id) = app.issue_active(LicensePlan::Pro, 3).await;

    let first = app
        .services
        .coordinator
        .allocate_seat(license_id, seat("  Owner@Shop.IO "))
        .await
        .unwrap();
    assert_eq!(first.seat.email, "owner@shop.io");

    let err = app
        .services
        .coordinator
        .allocate_seat(license_id, seat("owner@shop.io"))
        .await
        .unwrap_err();
    assert!(matches!(err, SeatError::DuplicateSeat));
    assert_eq!(app.store.count_seats(license_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_unactivated_license_refuses_seats() {
    let app = TestApp::new();
    let (_, record) = app.issue(LicensePlan::Pro, 3).await;

    let err = app
        .services
        .coordinator
        .allocate_seat(record.id, seat("owner@shop.io"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SeatError::LicenseNotUsable(UnusableReason::NotActivated)
    ));
}

#[tokio::test]
async fn test_expired_bound_license_refuses_seats() {
    let app = TestApp::new();
    let (_, record) = app.insert_expired(LicensePlan::Pro, 3).await;
    app.force_bind(record.id, MACHINE_A).await;

    let err = app
        .services
        .coordinator
        .allocate_seat(record.id, seat("owner@shop.io"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SeatError::LicenseNotUsable(UnusableReason::Expired)
    ));
}

#[tokio::test]
async fn test_request_validation() {
    let app = TestApp::new();
    let (_, license_id) = app.issue_active(LicensePlan::Basic, 3).await;
    let coordinator = &app.services.coordinator;

    let err = coordinator
        .allocate_seat(license_id, seat("not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, SeatError::InvalidEmail));

    let short_password = NewSeatRequest {
        password: "abc".to_string(),
        ..seat("owner@shop.io")
    };
    let err = coordinator
        .allocate_seat(license_id, short_password)
        .await
        .unwrap_err();
    assert!(matches!(err, SeatError::InvalidPassword(_)));

    let long_name = NewSeatRequest {
        display_name: "n".repeat(121),
        ..seat("owner@shop.io")
    };
    let err = coordinator
        .allocate_seat(license_id, long_name)
        .await
        .unwrap_err();
    assert!(matches!(err, SeatError::InvalidDisplayName));

    let err = coordinator
        .allocate_seat(LicenseId::new(), seat("owner@shop.io"))
        .await
        .unwrap_err();
    assert!(matches!(err, SeatError::NotFound));

    assert_eq!(app.store.count_seats(license_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_release_frees_a_slot() {
    let app = TestApp::new();
    let (_, license_id) = app.issue_active(LicensePlan::Basic, 1).await;
    let coordinator = &app.services.coordinator;

    let owner = NewSeatRequest {
        role: SeatRole::Owner,
        ..seat("owner@shop.io")
    };
    let allocation = coordinator.allocate_seat(license_id, owner).await.unwrap();
    assert_eq!(allocation.seat.role, SeatRole::Owner);

    let err = coordinator
        .allocate_seat(license_id, seat("clerk@shop.io"))
        .await
        .unwrap_err();
    assert!(matches!(err, SeatError::SeatLimitReached { used: 1, limit: 1 }));

    coordinator
        .release_seat(license_id, allocation.seat.id)
        .await
        .unwrap();
    let err = coordinator
        .release_seat(license_id, allocation.seat.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SeatError::SeatNotFound));

    let replacement = coordinator
        .allocate_seat(license_id, seat("clerk@shop.io"))
        .await
        .unwrap();
    assert_eq!(replacement.used, 1);
}

#[tokio::test]
async fn test_release_on_unknown_license() {
    let app = TestApp::new();
    let err = app
        .services
        .coordinator
        .release_seat(LicenseId::new(), SeatId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SeatError::NotFound));
}
