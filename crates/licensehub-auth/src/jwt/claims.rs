//! Claims carried by a seat session token.

use serde::{Deserialize, Serialize};

use licensehub_core::types::{LicenseId, SeatId};
use licensehub_entity::license::LicensePlan;
use licensehub_entity::seat::SeatRole;

/// JWT claims identifying a logged-in seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatClaims {
    /// Subject: the seat id.
    pub sub: SeatId,
    /// Seat email.
    pub email: String,
    /// Seat role at login time.
    pub role: SeatRole,
    /// License the seat belongs to.
    pub license_id: LicenseId,
    /// License plan at login time.
    pub plan: LicensePlan,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}
