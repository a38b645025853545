//! Integration tests for entitlement queries.

mod helpers;

use helpers::{MACHINE_A, MACHINE_B, TestApp, seat};
use licensehub_auth::VerifyError;
use licensehub_core::types::LicenseId;
use licensehub_entity::license::{LicensePlan, LicenseState, LicenseStatus};
use licensehub_service::QueryError;

#[tokio::test]
async fn test_snapshot_follows_lifecycle() {
    let app = TestApp::new();
    let (token, record) = app.issue(LicensePlan::Business, 4).await;
    let query = &app.services.query;

    let before = query.validate(&token).await.unwrap();
    assert_eq!(before.id, record.id);
    assert_eq!(before.customer_name, "Lucky Corner Shop");
    assert_eq!(before.status, LicenseStatus::Issued);
    assert_eq!(before.state, LicenseState::Issued);
    assert_eq!(before.seat_limit, 4);
    assert_eq!(before.seats_used, 0);
    assert!(before.features.multi_branch);
    assert!(before.bound_machine_id.is_none());
    assert!(!before.expired);

    app.services.coordinator.activate(&token, MACHINE_A).await.unwrap();
    app.services
        .coordinator
        .allocate_seat(record.id, seat("owner@shop.io"))
        .await
        .unwrap();

    let after = query.describe(record.id).await.unwrap();
    assert_eq!(after.state, LicenseState::Active);
    assert_eq!(after.bound_machine_id.as_deref(), Some(MACHINE_A));
    assert!(after.activated_at.is_some());
    assert_eq!(after.seats_used, 1);

    app.services.coordinator.revoke(record.id).await.unwrap();
    let revoked = query.validate(&token).await.unwrap();
    assert_eq!(revoked.status, LicenseStatus::Revoked);
    assert_eq!(revoked.state, LicenseState::Revoked);
}

#[tokio::test]
async fn test_validate_on_machine() {
    let app = TestApp::new();
    let (token, _) = app.issue(LicensePlan::Pro, 2).await;
    let query = &app.services.query;

    // an unbound license passes on any machine
    assert!(query.validate_on_machine(&token, MACHINE_B).await.is_ok());

    app.services.coordinator.activate(&token, MACHINE_A).await.unwrap();
    assert!(query.validate_on_machine(&token, MACHINE_A).await.is_ok());

    let err = query.validate_on_machine(&token, MACHINE_B).await.unwrap_err();
    assert!(matches!(err, QueryError::MachineMismatch));
}

#[tokio::test]
async fn test_expired_license_still_snapshots() {
    let app = TestApp::new();
    let (token, _) = app.insert_expired(LicensePlan::Basic, 1).await;

    let snapshot = app.services.query.validate(&token).await.unwrap();
    assert!(snapshot.expired);
    assert_eq!(snapshot.state, LicenseState::Expired);
    assert_eq!(snapshot.status, LicenseStatus::Issued);
}

#[tokio::test]
async fn test_lookup_failures() {
    let app = TestApp::new();
    let query = &app.services.query;

    let err = query.describe(LicenseId::new()).await.unwrap_err();
    assert!(matches!(err, QueryError::NotFound));

    let err = query.list_seats(LicenseId::new()).await.unwrap_err();
    assert!(matches!(err, QueryError::NotFound));

    let err = query.validate("not a token").await.unwrap_err();
    assert!(matches!(
        err,
        QueryError::InvalidToken(VerifyError::MalformedFormat)
    ));

    let err = query.validate("XX.body.sig").await.unwrap_err();
    assert!(matches!(
        err,
        QueryError::InvalidToken(VerifyError::WrongPrefix)
    ));
}

#[tokio::test]
async fn test_list_seats_in_creation_order() {
    let app = TestApp::new();
    let (_, license_id) = app.issue_active(LicensePlan::Pro, 3).await;

    for email in ["first@shop.io", "second@shop.io", "third@shop.io"] {
        app.services
            .coordinator
            .allocate_seat(license_id, seat(email))
            .await
            .unwrap();
    }

    let seats = app.services.query.list_seats(license_id).await.unwrap();
    let emails: Vec<_> = seats.iter().map(|s| s.email.as_str()).collect();
    assert_eq!(emails, ["first@shop.io", "second@shop.io", "third@shop.io"]);
}
