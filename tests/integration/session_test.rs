//! Integration tests for seat login and session checks.

mod helpers;

use helpers::{PASSWORD, TestApp, seat};
use licensehub_entity::license::{LicensePlan, LicenseState};
use licensehub_entity::seat::SeatRole;
use licensehub_service::{NewSeatRequest, SessionError};

#[tokio::test]
async fn test_login_then_whoami() {
    let app = TestApp::new();
    let (token, license_id) = app.issue_active(LicensePlan::Pro, 2).await;
    let owner = NewSeatRequest {
        role: SeatRole::Owner,
        ..seat("owner@shop.io")
    };
    let allocation = app
        .services
        .coordinator
        .allocate_seat(license_id, owner)
        .await
        .unwrap();

    let session = app
        .services
        .sessions
        .login(&token, "Owner@Shop.io", PASSWORD)
        .await
        .unwrap();
    assert_eq!(session.seat.id, allocation.seat.id);
    assert_eq!(session.license.id, license_id);
    assert!(session.expires_at > chrono::Utc::now());

    let claims = app
        .services
        .sessions
        .authenticate(&session.access_token)
        .unwrap();
    assert_eq!(claims.sub, allocation.seat.id);
    assert_eq!(claims.license_id, license_id);
    assert_eq!(claims.role, SeatRole::Owner);
    assert_eq!(claims.plan, LicensePlan::Pro);

    let (seat, snapshot) = app
        .services
        .sessions
        .whoami(&session.access_token)
        .await
        .unwrap();
    assert_eq!(seat.email, "owner@shop.io");
    assert_eq!(snapshot.state, LicenseState::Active);
    assert_eq!(snapshot.seats_used, 1);
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let app = TestApp::new();
    let (token, license_id) = app.issue_active(LicensePlan::Basic, 2).await;
    app.services
        .coordinator
        .allocate_seat(license_id, seat("clerk@shop.io"))
        .await
        .unwrap();

    let wrong_password = app
        .services
        .sessions
        .login(&token, "clerk@shop.io", "not-the-password")
        .await
        .unwrap_err();
    let unknown_email = app
        .services
        .sessions
        .login(&token, "ghost@shop.io", PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, SessionError::InvalidCredentials));
    assert!(matches!(unknown_email, SessionError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_revoked_license_refuses_login() {
    let app = TestApp::new();
    let (token, license_id) = app.issue_active(LicensePlan::Basic, 1).await;
    app.services
        .coordinator
        .allocate_seat(license_id, seat("clerk@shop.io"))
        .await
        .unwrap();
    app.services.coordinator.revoke(license_id).await.unwrap();

    let err = app
        .services
        .sessions
        .login(&token, "clerk@shop.io", PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Revoked));
}

#[tokio::test]
async fn test_garbage_session_token() {
    let app = TestApp::new();

    let err = app.services.sessions.whoami("not.a.jwt").await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidSession(_)));

    let err = app.services.sessions.authenticate("").unwrap_err();
    assert!(matches!(err, SessionError::InvalidSession(_)));
}
