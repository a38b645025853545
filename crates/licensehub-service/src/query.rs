//! Read-only entitlement queries. No lock is taken and nothing is mutated.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use licensehub_auth::{LicenseSigner, digest};
use licensehub_core::types::LicenseId;
use licensehub_database::EntitlementStore;
use licensehub_entity::license::{
    LicensePlan, LicenseRecord, LicenseState, LicenseStatus, PlanFeatures,
};
use licensehub_entity::seat::SeatRecord;

use crate::error::QueryError;

/// Point-in-time view of a license's entitlements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSnapshot {
    /// License id.
    pub id: LicenseId,
    /// Customer name.
    pub customer_name: String,
    /// Plan.
    pub plan: LicensePlan,
    /// Features the plan unlocks.
    pub features: PlanFeatures,
    /// Seat ceiling.
    pub seat_limit: u32,
    /// Seats currently provisioned.
    pub seats_used: u32,
    /// Bound machine, if activated.
    pub bound_machine_id: Option<String>,
    /// Activation time, if activated.
    pub activated_at: Option<DateTime<Utc>>,
    /// Stored status.
    pub status: LicenseStatus,
    /// Lifecycle state derived at snapshot time.
    pub state: LicenseState,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Whether the license was past its expiry at snapshot time.
    pub expired: bool,
}

impl EntitlementSnapshot {
    fn build(record: &LicenseRecord, seats_used: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id,
            customer_name: record.customer_name.clone(),
            plan: record.plan,
            features: record.plan.features(),
            seat_limit: record.seat_capacity(),
            seats_used,
            bound_machine_id: record.bound_machine_id.clone(),
            activated_at: record.activated_at,
            status: record.status,
            state: record.state_at(now),
            expires_at: record.expires_at,
            expired: record.is_expired_at(now),
        }
    }
}

/// Answers "is this license good" and "what does it entitle".
#[derive(Debug, Clone)]
pub struct EntitlementQueryService {
    store: Arc<dyn EntitlementStore>,
    signer: Arc<LicenseSigner>,
}

impl EntitlementQueryService {
    /// Creates a new query service.
    pub fn new(store: Arc<dyn EntitlementStore>, signer: Arc<LicenseSigner>) -> Self {
        Self { store, signer }
    }

    /// Snapshot of the license a token refers to.
    ///
    /// Expired and revoked licenses still produce a snapshot; callers read
    /// `expired` and `status`.
    pub async fn validate(&self, token: &str) -> Result<EntitlementSnapshot, QueryError> {
        let record = self.resolve(token).await?;
        self.snapshot(&record).await
    }

    /// Like [`validate`](Self::validate), but refuses a license bound to a
    /// different machine. An unbound license passes.
    pub async fn validate_on_machine(
        &self,
        token: &str,
        machine_id: &str,
    ) -> Result<EntitlementSnapshot, QueryError> {
        let record = self.resolve(token).await?;
        if let Some(bound) = record.bound_machine_id.as_deref() {
            if bound != machine_id {
                debug!(license_id = %record.id, "Validation refused: machine mismatch");
                return Err(QueryError::MachineMismatch);
            }
        }
        self.snapshot(&record).await
    }

    /// Snapshot of a license by id.
    pub async fn describe(&self, license_id: LicenseId) -> Result<EntitlementSnapshot, QueryError> {
        let record = self
            .store
            .find_by_id(license_id)
            .await?
            .ok_or(QueryError::NotFound)?;
        self.snapshot(&record).await
    }

    /// Seats of a license, oldest first.
    pub async fn list_seats(&self, license_id: LicenseId) -> Result<Vec<SeatRecord>, QueryError> {
        if self.store.find_by_id(license_id).await?.is_none() {
            return Err(QueryError::NotFound);
        }
        Ok(self.store.list_seats(license_id).await?)
    }

    async fn resolve(&self, token: &str) -> Result<LicenseRecord, QueryError> {
        self.signer.verify(token).map_err(QueryError::InvalidToken)?;
        self.store
            .find_by_digest(&digest(token))
            .await?
            .ok_or(QueryError::NotFound)
    }

    async fn snapshot(&self, record: &LicenseRecord) -> Result<EntitlementSnapshot, QueryError> {
        let seats_used = self.store.count_seats(record.id).await?;
        Ok(EntitlementSnapshot::build(record, seats_used, Utc::now()))
    }
}
