//! The signed license payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use licensehub_entity::license::LicensePlan;

/// Highest payload schema version this build understands.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Entitlement terms embedded in every license token.
///
/// Immutable once signed: any change invalidates the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensePayload {
    /// Payload schema version.
    pub schema_version: u32,
    /// Product the license is for.
    pub product: String,
    /// Commercial plan.
    pub plan: LicensePlan,
    /// Maximum number of seats.
    pub seat_limit: u32,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Identifier of the signing key.
    pub issuer_key_id: String,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
}
