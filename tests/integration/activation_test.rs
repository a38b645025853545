//! Integration tests for machine binding and the license lifecycle.

mod helpers;

use futures::future::join_all;

use helpers::{MACHINE_A, MACHINE_B, TestApp, seat};
use licensehub_auth::VerifyError;
use licensehub_core::types::LicenseId;
use licensehub_database::EntitlementStore;
use licensehub_entity::license::{LicensePlan, LicenseStatus};
use licensehub_service::{ActivationError, ActivationOutcome, RevokeError, SeatError, UnusableReason};

#[tokio::test]
async fn test_end_to_end_activation_and_seats() {
    let app = TestApp::new();
    let (token, record) = app.issue(LicensePlan::Pro, 3).await;
    assert_eq!(record.status, LicenseStatus::Issued);

    let outcome = app
        .services
        .coordinator
        .activate(&token, MACHINE_A)
        .await
        .unwrap();
    let ActivationOutcome::Activated(activated) = outcome else {
        panic!("expected a fresh activation, got {outcome:?}");
    };
    assert_eq!(activated.license.bound_machine_id.as_deref(), Some(MACHINE_A));
    assert!(activated.features.ocr);
    assert!(!activated.features.multi_branch);

    let err = app
        .services
        .coordinator
        .activate(&token, MACHINE_B)
        .await
        .unwrap_err();
    assert!(matches!(err, ActivationError::MachineMismatch));

    for n in 1..=3u32 {
        let allocation = app
            .services
            .coordinator
            .allocate_seat(record.id, seat(&format!("clerk{n}@shop.io")))
            .await
            .unwrap();
        assert_eq!(allocation.used, n);
        assert_eq!(allocation.limit, 3);
    }

    let err = app
        .services
        .coordinator
        .allocate_seat(record.id, seat("clerk4@shop.io"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SeatError::SeatLimitReached { used: 3, limit: 3 }
    ));
}

#[tokio::test]
async fn test_reactivation_on_same_machine_is_idempotent() {
    let app = TestApp::new();
    let (token, record) = app.issue(LicensePlan::Basic, 1).await;

    let first = app.services.coordinator.activate(&token, MACHINE_A).await.unwrap();
    let again = app.services.coordinator.activate(&token, MACHINE_A).await.unwrap();

    assert!(matches!(first, ActivationOutcome::Activated(_)));
    assert!(matches!(again, ActivationOutcome::AlreadyActive(_)));
    assert_eq!(
        first.license().license.activated_at,
        again.license().license.activated_at
    );

    let stored = app.store.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(stored.bound_machine_id.as_deref(), Some(MACHINE_A));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_activations_bind_exactly_once() {
    let app = TestApp::new();
    let (token, record) = app.issue(LicensePlan::Business, 2).await;

    let attempts = (0..16).map(|i| {
        let coordinator = app.services.coordinator.clone();
        let token = token.clone();
        tokio::spawn(async move { coordinator.activate(&token, &format!("machine-{i:04}")).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let activated: Vec<_> = results
        .iter()
        .filter_map(|r| match r {
            Ok(ActivationOutcome::Activated(a)) => Some(a),
            _ => None,
        })
        .collect();
    let mismatched = results
        .iter()
        .filter(|r| matches!(r, Err(ActivationError::MachineMismatch)))
        .count();

    assert_eq!(activated.len(), 1);
    assert_eq!(mismatched, 15);

    let stored = app.store.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(stored.bound_machine_id, activated[0].license.bound_machine_id);
}

#[tokio::test]
async fn test_revoked_license_is_terminal() {
    let app = TestApp::new();
    let (token, license_id) = app.issue_active(LicensePlan::Pro, 3).await;
    app.services
        .coordinator
        .allocate_seat(license_id, seat("owner@shop.io"))
        .await
        .unwrap();

    let summary = app.services.coordinator.revoke(license_id).await.unwrap();
    assert_eq!(summary.status, LicenseStatus::Revoked);
    let again = app.services.coordinator.revoke(license_id).await.unwrap();
    assert_eq!(again.status, LicenseStatus::Revoked);

    let err = app
        .services
        .coordinator
        .activate(&token, MACHINE_A)
        .await
        .unwrap_err();
    assert!(matches!(err, ActivationError::Revoked));

    let err = app
        .services
        .coordinator
        .allocate_seat(license_id, seat("late@shop.io"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SeatError::LicenseNotUsable(UnusableReason::Revoked)
    ));

    // seats survive revocation
    assert_eq!(app.store.count_seats(license_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_revoke_unknown_license() {
    let app = TestApp::new();
    let err = app
        .services
        .coordinator
        .revoke(LicenseId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RevokeError::NotFound));
}

#[tokio::test]
async fn test_expired_license_refuses_activation() {
    let app = TestApp::new();
    let (token, _) = app.insert_expired(LicensePlan::Basic, 1).await;

    let err = app
        .services
        .coordinator
        .activate(&token, MACHINE_A)
        .await
        .unwrap_err();
    assert!(matches!(err, ActivationError::Expired));
}

#[tokio::test]
async fn test_input_and_lookup_failures() {
    let app = TestApp::new();
    let (token, _) = app.issue(LicensePlan::Basic, 1).await;

    let err = app.services.coordinator.activate(&token, "short").await.unwrap_err();
    assert!(matches!(err, ActivationError::InvalidMachineId));

    let too_long = "m".repeat(201);
    let err = app.services.coordinator.activate(&token, &too_long).await.unwrap_err();
    assert!(matches!(err, ActivationError::InvalidMachineId));

    let err = app
        .services
        .coordinator
        .activate("EL.garbage.signature", MACHINE_A)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ActivationError::InvalidToken(VerifyError::BadSignature)
    ));

    // correctly signed, never stored
    let now = chrono::Utc::now();
    let orphan = app.signer.issue(&app.signer.new_payload(
        LicensePlan::Pro,
        1,
        now,
        now + chrono::Duration::days(1),
        "orphan",
    ));
    let err = app.services.coordinator.activate(&orphan, MACHINE_A).await.unwrap_err();
    assert!(matches!(err, ActivationError::NotFound));
}
