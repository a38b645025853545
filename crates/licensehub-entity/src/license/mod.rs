//! License entities.

pub mod model;
pub mod plan;
pub mod status;

pub use model::{LicenseRecord, LicenseSummary, NewLicense};
pub use plan::{LicensePlan, PlanFeatures};
pub use status::{LicenseState, LicenseStatus};
