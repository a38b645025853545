//! License issuance.

use std::sync::Arc;

use chrono::{Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use licensehub_auth::{LicenseSigner, digest};
use licensehub_database::EntitlementStore;
use licensehub_entity::license::{LicensePlan, LicenseRecord, NewLicense};

use crate::error::IssueError;

/// Administrative request to sell a license.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueLicense {
    /// Customer name.
    #[validate(length(min = 1, max = 120))]
    pub customer_name: String,
    /// Plan.
    pub plan: LicensePlan,
    /// Validity in whole years.
    #[validate(range(min = 1, max = 5))]
    pub years: u32,
    /// Seat ceiling.
    #[validate(range(min = 1, max = 200))]
    pub seat_limit: u32,
    /// Free-form note.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub note: String,
}

/// A freshly issued license. The token is only ever available here.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedLicense {
    /// The license token to hand to the customer.
    pub token: String,
    /// Persisted record.
    pub record: LicenseRecord,
}

/// Creates licenses.
#[derive(Debug, Clone)]
pub struct IssuanceService {
    store: Arc<dyn EntitlementStore>,
    signer: Arc<LicenseSigner>,
}

impl IssuanceService {
    /// Creates a new issuance service.
    pub fn new(store: Arc<dyn EntitlementStore>, signer: Arc<LicenseSigner>) -> Self {
        Self { store, signer }
    }

    /// Sign a new token and persist its digest.
    pub async fn issue(&self, request: IssueLicense) -> Result<IssuedLicense, IssueError> {
        let request = IssueLicense {
            customer_name: request.customer_name.trim().to_string(),
            ..request
        };
        request
            .validate()
            .map_err(|e| IssueError::Validation(e.to_string()))?;

        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_months(Months::new(12 * request.years))
            .ok_or_else(|| IssueError::Validation("expiry out of range".to_string()))?;

        let payload = self.signer.new_payload(
            request.plan,
            request.seat_limit,
            issued_at,
            expires_at,
            request.note.clone(),
        );
        let token = self.signer.issue(&payload);

        let record = self
            .store
            .create(NewLicense {
                license_token_digest: digest(&token),
                customer_name: request.customer_name,
                plan: request.plan,
                expires_at,
                seat_limit: request.seat_limit as i32,
                note: request.note,
            })
            .await?;

        info!(
            license_id = %record.id,
            plan = %record.plan,
            seat_limit = record.seat_limit,
            digest = %record.digest_hint(),
            "License issued"
        );

        Ok(IssuedLicense { token, record })
    }
}
