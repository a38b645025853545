//! License record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use licensehub_core::types::LicenseId;

use super::plan::LicensePlan;
use super::status::{LicenseState, LicenseStatus};

/// A persisted license. The raw token is never stored, only its digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LicenseRecord {
    /// Internal identifier.
    pub id: LicenseId,
    /// One-way digest of the license token (unique).
    #[serde(skip_serializing, default)]
    pub license_token_digest: String,
    /// Customer the license was sold to.
    pub customer_name: String,
    /// Plan the license was sold under.
    pub plan: LicensePlan,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Maximum number of seats.
    pub seat_limit: i32,
    /// Stored status.
    pub status: LicenseStatus,
    /// Machine the license is bound to, set once by the first activation.
    pub bound_machine_id: Option<String>,
    /// When the machine was bound.
    pub activated_at: Option<DateTime<Utc>>,
    /// Free-form administrative note.
    pub note: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LicenseRecord {
    /// Whether `now` is past the validity window.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the license was revoked.
    pub fn is_revoked(&self) -> bool {
        self.status == LicenseStatus::Revoked
    }

    /// Lifecycle state at `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> LicenseState {
        if self.is_revoked() {
            LicenseState::Revoked
        } else if self.is_expired_at(now) {
            LicenseState::Expired
        } else if self.status == LicenseStatus::Active {
            LicenseState::Active
        } else {
            LicenseState::Issued
        }
    }

    /// Seat limit as an unsigned count.
    pub fn seat_capacity(&self) -> u32 {
        self.seat_limit.max(0) as u32
    }

    /// Short digest prefix, safe to log.
    pub fn digest_hint(&self) -> &str {
        let end = self.license_token_digest.len().min(8);
        &self.license_token_digest[..end]
    }
}

/// Fields required to create a license record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLicense {
    /// Token digest.
    pub license_token_digest: String,
    /// Customer name.
    pub customer_name: String,
    /// Plan.
    pub plan: LicensePlan,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
    /// Seat limit.
    pub seat_limit: i32,
    /// Note.
    pub note: String,
}

/// Public view of a license returned by activation and issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSummary {
    /// Internal identifier.
    pub id: LicenseId,
    /// Customer name.
    pub customer_name: String,
    /// Plan.
    pub plan: LicensePlan,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
    /// Seat limit.
    pub seat_limit: i32,
    /// Stored status.
    pub status: LicenseStatus,
    /// Bound machine, if any.
    pub bound_machine_id: Option<String>,
    /// Activation time, if any.
    pub activated_at: Option<DateTime<Utc>>,
}

impl From<&LicenseRecord> for LicenseSummary {
    fn from(record: &LicenseRecord) -> Self {
        Self {
            id: record.id,
            customer_name: record.customer_name.clone(),
            plan: record.plan,
            expires_at: record.expires_at,
            seat_limit: record.seat_limit,
            status: record.status,
            bound_machine_id: record.bound_machine_id.clone(),
            activated_at: record.activated_at,
        }
    }
}
