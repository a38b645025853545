//! Entitlement store: persistence contract over license and seat records.
//!
//! Two implementations are provided:
//! - PostgreSQL, holding `SELECT ... FOR UPDATE` on the license row inside a
//!   transaction (correct across any number of processes)
//! - In-memory, holding a per-license `tokio::sync::Mutex` (single process,
//!   used by tests and local tooling)

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use thiserror::Error;

use licensehub_core::error::{AppError, ErrorKind};
use licensehub_core::types::{LicenseId, SeatId};
use licensehub_entity::license::{LicenseRecord, LicenseStatus, NewLicense};
use licensehub_entity::seat::{NewSeat, SeatRecord};

pub use memory::MemoryEntitlementStore;
pub use postgres::PgEntitlementStore;

/// Failures surfaced by an entitlement store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A license with the same token digest already exists.
    #[error("a license with this token digest already exists")]
    DuplicateDigest,
    /// The email is already seated under this license.
    #[error("a seat with this email already exists for the license")]
    DuplicateSeat,
    /// Lock timeout, serialization failure, or deadlock. Safe to retry.
    #[error("store contention: {0}")]
    Contention(String),
    /// Any other storage failure.
    #[error(transparent)]
    Backend(#[from] AppError),
}

impl StoreError {
    /// Whether the caller may retry the whole operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Contention(_) | Self::DuplicateDigest)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateDigest
            | StoreError::DuplicateSeat
            | StoreError::Contention(_) => AppError::new(ErrorKind::Conflict, err.to_string()),
            StoreError::Backend(inner) => inner,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Exclusive scope over a single license row.
///
/// While a scope is alive no other scope for the same license can be
/// opened. Mutations become visible only through [`LicenseScope::commit`];
/// dropping the scope discards them.
#[async_trait]
pub trait LicenseScope: Send {
    /// The locked record, reflecting mutations made in this scope.
    fn record(&self) -> &LicenseRecord;

    /// Number of seats under the license, including ones inserted in this scope.
    async fn count_seats(&mut self) -> StoreResult<u32>;

    /// Seat with the given (lowercased) email, if any.
    async fn find_seat_by_email(&mut self, email: &str) -> StoreResult<Option<SeatRecord>>;

    /// Bind the machine, mark the license active and stamp the activation time.
    async fn bind_machine(
        &mut self,
        machine_id: &str,
        activated_at: DateTime<Utc>,
    ) -> StoreResult<LicenseRecord>;

    /// Overwrite the stored status.
    async fn set_status(&mut self, status: LicenseStatus) -> StoreResult<LicenseRecord>;

    /// Insert a seat.
    async fn insert_seat(&mut self, seat: NewSeat) -> StoreResult<SeatRecord>;

    /// Delete a seat of this license. Returns `false` if it did not exist.
    async fn remove_seat(&mut self, seat_id: SeatId) -> StoreResult<bool>;

    /// Make every mutation of this scope durable and release the lock.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Persistence contract the coordinator and query services depend on.
#[async_trait]
pub trait EntitlementStore: Send + Sync + std::fmt::Debug {
    /// Look a license up by its token digest.
    async fn find_by_digest(&self, digest: &str) -> StoreResult<Option<LicenseRecord>>;

    /// Look a license up by id.
    async fn find_by_id(&self, id: LicenseId) -> StoreResult<Option<LicenseRecord>>;

    /// Create a license in the `issued` state.
    ///
    /// Fails with [`StoreError::DuplicateDigest`] rather than returning the
    /// existing row.
    async fn create(&self, license: NewLicense) -> StoreResult<LicenseRecord>;

    /// Number of seats under a license.
    async fn count_seats(&self, license_id: LicenseId) -> StoreResult<u32>;

    /// All seats of a license, oldest first.
    async fn list_seats(&self, license_id: LicenseId) -> StoreResult<Vec<SeatRecord>>;

    /// Seat of a license by (lowercased) email.
    async fn find_seat_by_email(
        &self,
        license_id: LicenseId,
        email: &str,
    ) -> StoreResult<Option<SeatRecord>>;

    /// Open an exclusive scope on a license. `None` if the license does not exist.
    async fn lock(&self, license_id: LicenseId) -> StoreResult<Option<Box<dyn LicenseScope>>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> StoreResult<bool>;
}

/// Run `f` against a license while holding its exclusive scope.
///
/// `Ok` commits every mutation `f` made; `Err` discards them. Returns
/// `Ok(None)` when the license does not exist.
pub async fn with_exclusive_lock<T, E, F>(
    store: &dyn EntitlementStore,
    license_id: LicenseId,
    f: F,
) -> Result<Option<T>, E>
where
    F: for<'s> FnOnce(&'s mut (dyn LicenseScope + 'static)) -> BoxFuture<'s, Result<T, E>>,
    E: From<StoreError>,
{
    let Some(mut scope) = store.lock(license_id).await? else {
        return Ok(None);
    };

    let value = f(scope.as_mut()).await?;
    scope.commit().await?;
    Ok(Some(value))
}
