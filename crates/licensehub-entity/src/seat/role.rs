//! Seat role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a provisioned seat within its license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seat_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SeatRole {
    /// Shop owner; manages the other seats.
    Owner,
    /// Counter clerk.
    #[default]
    Clerk,
}

impl SeatRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Clerk => "clerk",
        }
    }
}

impl fmt::Display for SeatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SeatRole {
    type Err = licensehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "clerk" => Ok(Self::Clerk),
            _ => Err(licensehub_core::AppError::validation(format!(
                "Invalid seat role: '{s}'. Expected one of: owner, clerk"
            ))),
        }
    }
}
