//! Seat entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use licensehub_core::types::{LicenseId, SeatId};

use super::role::SeatRole;

/// A provisioned user slot under a license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SeatRecord {
    /// Internal identifier.
    pub id: SeatId,
    /// Owning license.
    pub license_id: LicenseId,
    /// Lowercased email, unique within the license.
    pub email: String,
    /// Role within the license.
    pub role: SeatRole,
    /// Display name.
    pub display_name: String,
    /// Argon2id hash of the seat password.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a seat. Only the activation coordinator builds
/// these, inside the license's exclusive scope.
#[derive(Debug, Clone)]
pub struct NewSeat {
    /// Owning license.
    pub license_id: LicenseId,
    /// Lowercased email.
    pub email: String,
    /// Role.
    pub role: SeatRole,
    /// Display name.
    pub display_name: String,
    /// Argon2id password hash.
    pub password_hash: String,
}
