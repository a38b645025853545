//! Activation coordinator: machine binding, seat allocation and revocation.
//!
//! Every mutation runs inside the store's exclusive scope for the license,
//! so binding attempts and seat allocations for one license are totally
//! ordered while unrelated licenses never contend.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use licensehub_auth::{LicenseSigner, PasswordHasher, PasswordPolicy, digest};
use licensehub_core::types::{LicenseId, SeatId};
use licensehub_database::{EntitlementStore, with_exclusive_lock};
use licensehub_entity::license::{LicenseRecord, LicenseStatus, LicenseSummary, PlanFeatures};
use licensehub_entity::seat::{NewSeat, SeatRecord, SeatRole};

use crate::error::{ActivationError, RevokeError, SeatError, UnusableReason};

/// Accepted machine id length, in characters.
const MACHINE_ID_LEN: std::ops::RangeInclusive<usize> = 6..=200;

/// A bound license as returned to the activating client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivatedLicense {
    /// Public license view.
    pub license: LicenseSummary,
    /// Features the plan unlocks.
    pub features: PlanFeatures,
}

impl From<&LicenseRecord> for ActivatedLicense {
    fn from(record: &LicenseRecord) -> Self {
        Self {
            license: LicenseSummary::from(record),
            features: record.plan.features(),
        }
    }
}

/// Successful activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum ActivationOutcome {
    /// The machine was bound by this call.
    Activated(ActivatedLicense),
    /// The license was already bound to this same machine; nothing changed.
    AlreadyActive(ActivatedLicense),
}

impl ActivationOutcome {
    /// The license, whichever way activation succeeded.
    pub fn license(&self) -> &ActivatedLicense {
        match self {
            Self::Activated(l) | Self::AlreadyActive(l) => l,
        }
    }
}

/// Seat to provision under a license.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewSeatRequest {
    /// Login email; stored lowercase.
    #[validate(email)]
    pub email: String,
    /// Role within the license.
    #[serde(default)]
    pub role: SeatRole,
    /// Plaintext password; only its Argon2id hash is stored.
    pub password: String,
    /// Display name.
    #[serde(default)]
    #[validate(length(max = 120))]
    pub display_name: String,
}

/// Result of a successful seat allocation.
#[derive(Debug, Clone, Serialize)]
pub struct SeatAllocation {
    /// The new seat.
    pub seat: SeatRecord,
    /// Seats in use after insertion.
    pub used: u32,
    /// Seat ceiling.
    pub limit: u32,
}

/// Coordinates every state change of a license.
#[derive(Debug, Clone)]
pub struct ActivationCoordinator {
    /// Entitlement store.
    store: Arc<dyn EntitlementStore>,
    /// Token verifier.
    signer: Arc<LicenseSigner>,
    /// Seat password hasher.
    hasher: Arc<PasswordHasher>,
    /// Seat password length policy.
    policy: PasswordPolicy,
}

impl ActivationCoordinator {
    /// Creates a new coordinator.
    pub fn new(
        store: Arc<dyn EntitlementStore>,
        signer: Arc<LicenseSigner>,
        hasher: Arc<PasswordHasher>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            signer,
            hasher,
            policy,
        }
    }

    /// Bind a license to a machine.
    ///
    /// The first machine wins. Re-activating from that same machine is an
    /// idempotent success; any other machine gets `MachineMismatch`.
    pub async fn activate(
        &self,
        token: &str,
        machine_id: &str,
    ) -> Result<ActivationOutcome, ActivationError> {
        if !MACHINE_ID_LEN.contains(&machine_id.chars().count()) {
            return Err(ActivationError::InvalidMachineId);
        }

        self.signer
            .verify(token)
            .map_err(ActivationError::InvalidToken)?;

        let record = self
            .store
            .find_by_digest(&digest(token))
            .await?
            .ok_or(ActivationError::NotFound)?;
        check_activatable(&record)?;

        let machine = machine_id.to_string();
        let outcome = with_exclusive_lock::<_, ActivationError, _>(
            self.store.as_ref(),
            record.id,
            move |scope| {
                Box::pin(async move {
                    let current = scope.record().clone();
                    check_activatable(&current)?;

                    match current.bound_machine_id.as_deref() {
                        None => {
                            let bound = scope.bind_machine(&machine, Utc::now()).await?;
                            Ok(ActivationOutcome::Activated(ActivatedLicense::from(&bound)))
                        }
                        Some(bound) if bound == machine => Ok(ActivationOutcome::AlreadyActive(
                            ActivatedLicense::from(&current),
                        )),
                        Some(_) => Err(ActivationError::MachineMismatch),
                    }
                })
            },
        )
        .await;

        match &outcome {
            Ok(Some(ActivationOutcome::Activated(_))) => {
                info!(license_id = %record.id, digest = %record.digest_hint(), "License activated");
            }
            Ok(Some(ActivationOutcome::AlreadyActive(_))) => {
                info!(license_id = %record.id, "License re-activated on bound machine");
            }
            Err(ActivationError::MachineMismatch) => {
                warn!(license_id = %record.id, "Activation refused: machine mismatch");
            }
            _ => {}
        }

        outcome?.ok_or(ActivationError::NotFound)
    }

    /// Provision a seat, enforcing the license's seat ceiling.
    pub async fn allocate_seat(
        &self,
        license_id: LicenseId,
        request: NewSeatRequest,
    ) -> Result<SeatAllocation, SeatError> {
        let request = NewSeatRequest {
            email: request.email.trim().to_lowercase(),
            display_name: request.display_name.trim().to_string(),
            ..request
        };
        if let Err(errors) = request.validate() {
            let fields = errors.field_errors();
            return Err(if fields.contains_key("email") {
                SeatError::InvalidEmail
            } else {
                SeatError::InvalidDisplayName
            });
        }
        self.policy
            .check(&request.password)
            .map_err(SeatError::InvalidPassword)?;

        let password_hash = self
            .hasher
            .hash_password(&request.password)
            .map_err(SeatError::Internal)?;

        let new_seat = NewSeat {
            license_id,
            email: request.email,
            role: request.role,
            display_name: request.display_name,
            password_hash,
        };

        let result = with_exclusive_lock::<_, SeatError, _>(
            self.store.as_ref(),
            license_id,
            move |scope| {
                Box::pin(async move {
                    let record = scope.record().clone();
                    if let Some(reason) = unusable_reason(&record) {
                        return Err(SeatError::LicenseNotUsable(reason));
                    }

                    let used = scope.count_seats().await?;
                    let limit = record.seat_capacity();
                    if used >= limit {
                        return Err(SeatError::SeatLimitReached { used, limit });
                    }

                    if scope.find_seat_by_email(&new_seat.email).await?.is_some() {
                        return Err(SeatError::DuplicateSeat);
                    }

                    let seat = scope.insert_seat(new_seat).await?;
                    Ok(SeatAllocation {
                        seat,
                        used: used + 1,
                        limit,
                    })
                })
            },
        )
        .await;

        match &result {
            Ok(Some(allocation)) => info!(
                license_id = %license_id,
                seat_id = %allocation.seat.id,
                role = %allocation.seat.role,
                used = allocation.used,
                limit = allocation.limit,
                "Seat allocated"
            ),
            Err(SeatError::SeatLimitReached { used, limit }) => warn!(
                license_id = %license_id,
                used,
                limit,
                "Seat allocation denied: limit reached"
            ),
            _ => {}
        }

        result?.ok_or(SeatError::NotFound)
    }

    /// Remove a seat, freeing one slot.
    pub async fn release_seat(
        &self,
        license_id: LicenseId,
        seat_id: SeatId,
    ) -> Result<(), SeatError> {
        let removed = with_exclusive_lock::<_, SeatError, _>(
            self.store.as_ref(),
            license_id,
            move |scope| {
                Box::pin(async move {
                    if scope.remove_seat(seat_id).await? {
                        Ok(())
                    } else {
                        Err(SeatError::SeatNotFound)
                    }
                })
            },
        )
        .await?;

        removed.ok_or(SeatError::NotFound)?;
        info!(license_id = %license_id, seat_id = %seat_id, "Seat released");
        Ok(())
    }

    /// Revoke a license. Revoking twice is a no-op; seats are kept.
    pub async fn revoke(&self, license_id: LicenseId) -> Result<LicenseSummary, RevokeError> {
        let revoked = with_exclusive_lock::<_, RevokeError, _>(
            self.store.as_ref(),
            license_id,
            |scope| {
                Box::pin(async move {
                    if scope.record().is_revoked() {
                        return Ok((LicenseSummary::from(scope.record()), false));
                    }
                    let updated = scope.set_status(LicenseStatus::Revoked).await?;
                    Ok((LicenseSummary::from(&updated), true))
                })
            },
        )
        .await?;

        let (summary, changed) = revoked.ok_or(RevokeError::NotFound)?;
        if changed {
            info!(license_id = %license_id, "License revoked");
        }
        Ok(summary)
    }
}

/// Terminal states refuse activation; revocation is reported first.
fn check_activatable(record: &LicenseRecord) -> Result<(), ActivationError> {
    if record.is_revoked() {
        return Err(ActivationError::Revoked);
    }
    if record.is_expired_at(Utc::now()) {
        return Err(ActivationError::Expired);
    }
    Ok(())
}

fn unusable_reason(record: &LicenseRecord) -> Option<UnusableReason> {
    if record.is_revoked() {
        Some(UnusableReason::Revoked)
    } else if record.is_expired_at(Utc::now()) {
        Some(UnusableReason::Expired)
    } else if record.status != LicenseStatus::Active {
        Some(UnusableReason::NotActivated)
    } else {
        None
    }
}
