//! Stored license status and the derived lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status column of a license record.
///
/// Expiry is not stored: it is derived from `expires_at` at check
/// time, see [`LicenseState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "license_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Created, no machine bound yet.
    Issued,
    /// Bound to a machine.
    Active,
    /// Revoked by an administrator. Terminal.
    Revoked,
}

impl LicenseStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a license at a given instant.
///
/// `Issued -> Active`, with `Expired` (time) and `Revoked` (admin) terminal.
/// Revocation wins over expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseState {
    /// No machine bound yet.
    Issued,
    /// Bound and within its validity window.
    Active,
    /// Past `expires_at`.
    Expired,
    /// Revoked.
    Revoked,
}

impl LicenseState {
    /// Whether no further activation or seat allocation may succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Revoked)
    }
}
