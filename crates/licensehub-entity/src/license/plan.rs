//! License plan enumeration and the features each plan unlocks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commercial plan a license was sold under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "license_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LicensePlan {
    /// Entry plan.
    Basic,
    /// Adds OCR.
    Pro,
    /// Adds OCR and multi-branch operation.
    Business,
}

/// Feature switches derived from a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    /// Data export.
    pub export: bool,
    /// Optical character recognition of paper tickets.
    pub ocr: bool,
    /// Several branches under one license.
    pub multi_branch: bool,
}

impl LicensePlan {
    /// Features unlocked by this plan.
    pub fn features(&self) -> PlanFeatures {
        let base = PlanFeatures {
            export: true,
            ocr: false,
            multi_branch: false,
        };
        match self {
            Self::Basic => base,
            Self::Pro => PlanFeatures { ocr: true, ..base },
            Self::Business => PlanFeatures {
                ocr: true,
                multi_branch: true,
                ..base
            },
        }
    }

    /// Return the plan as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Business => "business",
        }
    }
}

impl fmt::Display for LicensePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LicensePlan {
    type Err = licensehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            "business" => Ok(Self::Business),
            _ => Err(licensehub_core::AppError::validation(format!(
                "Invalid plan: '{s}'. Expected one of: basic, pro, business"
            ))),
        }
    }
}
