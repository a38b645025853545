//! Shared helpers: the full service graph over the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use licensehub_auth::{LicenseSigner, digest};
use licensehub_core::config::AppConfig;
use licensehub_core::types::LicenseId;
use licensehub_database::{EntitlementStore, MemoryEntitlementStore};
use licensehub_entity::license::{LicensePlan, LicenseRecord, NewLicense};
use licensehub_entity::seat::SeatRole;
use licensehub_service::{ActivationOutcome, IssueLicense, NewSeatRequest, Services};

pub const MACHINE_A: &str = "machine-A-0001";
pub const MACHINE_B: &str = "machine-B-0002";
pub const PASSWORD: &str = "counter-pass";

/// Test application context
pub struct TestApp {
    /// Every service, wired as in production
    pub services: Services,
    /// The store behind them, for direct fixture setup
    pub store: Arc<MemoryEntitlementStore>,
    /// Signer sharing the services' master key
    pub signer: LicenseSigner,
    /// Configuration used to build everything
    pub config: AppConfig,
}

/// Configuration with fixed secrets.
pub fn test_config() -> AppConfig {
    serde_json::from_value(serde_json::json!({
        "database": { "url": "postgres://unused/licensehub" },
        "license": { "master_key": "integration-master-key" },
        "auth": { "jwt_secret": "integration-jwt-secret" },
    }))
    .expect("valid test config")
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryEntitlementStore::new());
        let services = Services::new(&config, store.clone()).expect("services");
        let signer = LicenseSigner::new(&config.license).expect("signer");
        Self {
            services,
            store,
            signer,
            config,
        }
    }

    /// Issue a one-year license.
    pub async fn issue(&self, plan: LicensePlan, seats: u32) -> (String, LicenseRecord) {
        let issued = self
            .services
            .issuance
            .issue(IssueLicense {
                customer_name: "Lucky Corner Shop".to_string(),
                plan,
                years: 1,
                seat_limit: seats,
                note: String::new(),
            })
            .await
            .expect("issue license");
        (issued.token, issued.record)
    }

    /// Issue a license and activate it on [`MACHINE_A`].
    pub async fn issue_active(&self, plan: LicensePlan, seats: u32) -> (String, LicenseId) {
        let (token, record) = self.issue(plan, seats).await;
        let outcome = self
            .services
            .coordinator
            .activate(&token, MACHINE_A)
            .await
            .expect("activate");
        assert!(matches!(outcome, ActivationOutcome::Activated(_)));
        (token, record.id)
    }

    /// Store a validly signed license whose expiry is already past.
    pub async fn insert_expired(&self, plan: LicensePlan, seats: u32) -> (String, LicenseRecord) {
        self.insert_with_expiry(plan, seats, Utc::now() - Duration::days(1))
            .await
    }

    /// Store a validly signed license with an arbitrary expiry.
    pub async fn insert_with_expiry(
        &self,
        plan: LicensePlan,
        seats: u32,
        expires_at: DateTime<Utc>,
    ) -> (String, LicenseRecord) {
        let issued_at = expires_at - Duration::days(365);
        let payload = self.signer.new_payload(
            plan,
            seats,
            issued_at,
            expires_at,
            format!("fixture-{}", Uuid::new_v4()),
        );
        let token = self.signer.issue(&payload);
        let record = self
            .store
            .create(NewLicense {
                license_token_digest: digest(&token),
                customer_name: "Fixture".to_string(),
                plan,
                expires_at,
                seat_limit: seats as i32,
                note: payload.note.clone(),
            })
            .await
            .expect("create fixture license");
        (token, record)
    }

    /// Bind a machine straight through the store, skipping every policy check.
    pub async fn force_bind(&self, license_id: LicenseId, machine_id: &str) {
        let mut scope = self
            .store
            .lock(license_id)
            .await
            .expect("lock")
            .expect("license exists");
        scope
            .bind_machine(machine_id, Utc::now())
            .await
            .expect("bind");
        scope.commit().await.expect("commit");
    }
}

/// A clerk seat request with the shared test password.
pub fn seat(email: &str) -> NewSeatRequest {
    NewSeatRequest {
        email: email.to_string(),
        role: SeatRole::Clerk,
        password: PASSWORD.to_string(),
        display_name: String::new(),
    }
}
