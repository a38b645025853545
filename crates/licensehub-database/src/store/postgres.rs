//! PostgreSQL entitlement store.
//!
//! The exclusive scope is a transaction holding `FOR UPDATE` on the license
//! row, so mutual exclusion holds across every process sharing the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};

use licensehub_core::error::{AppError, ErrorKind};
use licensehub_core::types::{LicenseId, SeatId};
use licensehub_entity::license::{LicenseRecord, LicenseStatus, NewLicense};
use licensehub_entity::seat::{NewSeat, SeatRecord};

use super::{EntitlementStore, LicenseScope, StoreError, StoreResult};

/// Unique constraint on `licenses.license_token_digest`.
const DIGEST_CONSTRAINT: &str = "licenses_token_digest_key";
/// Unique constraint on `seats (license_id, email)`.
const SEAT_EMAIL_CONSTRAINT: &str = "seats_license_email_key";

/// Entitlement store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgEntitlementStore {
    pool: PgPool,
    /// `lock_timeout` applied to every exclusive scope.
    lock_timeout_ms: u64,
}

impl PgEntitlementStore {
    /// Create a new store.
    pub fn new(pool: PgPool, lock_timeout_ms: u64) -> Self {
        Self {
            pool,
            lock_timeout_ms,
        }
    }
}

/// Map a sqlx error onto the store taxonomy.
fn map_sqlx(context: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut => {
            return StoreError::Contention(format!("{context}: connection pool exhausted"));
        }
        sqlx::Error::Database(db) => {
            // lock_not_available, serialization_failure, deadlock_detected
            match db.code().as_deref() {
                Some("55P03") | Some("40001") | Some("40P01") => {
                    return StoreError::Contention(format!("{context}: {}", db.message()));
                }
                Some("23505") => match db.constraint() {
                    Some(DIGEST_CONSTRAINT) => return StoreError::DuplicateDigest,
                    Some(SEAT_EMAIL_CONSTRAINT) => return StoreError::DuplicateSeat,
                    _ => {}
                },
                _ => {}
            }
        }
        _ => {}
    }
    StoreError::Backend(AppError::with_source(
        ErrorKind::Database,
        context.to_string(),
        err,
    ))
}

#[async_trait]
impl EntitlementStore for PgEntitlementStore {
    async fn find_by_digest(&self, digest: &str) -> StoreResult<Option<LicenseRecord>> {
        sqlx::query_as::<_, LicenseRecord>(
            "SELECT * FROM licenses WHERE license_token_digest = $1",
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to find license by digest", e))
    }

    async fn find_by_id(&self, id: LicenseId) -> StoreResult<Option<LicenseRecord>> {
        sqlx::query_as::<_, LicenseRecord>("SELECT * FROM licenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find license by id", e))
    }

    async fn create(&self, license: NewLicense) -> StoreResult<LicenseRecord> {
        sqlx::query_as::<_, LicenseRecord>(
            "INSERT INTO licenses \
                (id, license_token_digest, customer_name, plan, expires_at, seat_limit, note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(LicenseId::new())
        .bind(&license.license_token_digest)
        .bind(&license.customer_name)
        .bind(license.plan)
        .bind(license.expires_at)
        .bind(license.seat_limit)
        .bind(&license.note)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to create license", e))
    }

    async fn count_seats(&self, license_id: LicenseId) -> StoreResult<u32> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats WHERE license_id = $1")
            .bind(license_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to count seats", e))?;
        Ok(count as u32)
    }

    async fn list_seats(&self, license_id: LicenseId) -> StoreResult<Vec<SeatRecord>> {
        sqlx::query_as::<_, SeatRecord>(
            "SELECT * FROM seats WHERE license_id = $1 ORDER BY created_at ASC",
        )
        .bind(license_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list seats", e))
    }

    async fn find_seat_by_email(
        &self,
        license_id: LicenseId,
        email: &str,
    ) -> StoreResult<Option<SeatRecord>> {
        sqlx::query_as::<_, SeatRecord>(
            "SELECT * FROM seats WHERE license_id = $1 AND email = LOWER($2)",
        )
        .bind(license_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to find seat by email", e))
    }

    async fn lock(&self, license_id: LicenseId) -> StoreResult<Option<Box<dyn LicenseScope>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx("Failed to begin transaction", e))?;

        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout_ms))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx("Failed to set lock timeout", e))?;

        let record = sqlx::query_as::<_, LicenseRecord>(
            "SELECT * FROM licenses WHERE id = $1 FOR UPDATE",
        )
        .bind(license_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx("Failed to lock license", e))?;

        match record {
            Some(record) => {
                debug!(license_id = %license_id, "License row locked");
                Ok(Some(Box::new(PgLicenseScope { tx, record })))
            }
            None => {
                if let Err(e) = tx.rollback().await {
                    warn!(error = %e, "Rollback after missing license failed");
                }
                Ok(None)
            }
        }
    }

    async fn health_check(&self) -> StoreResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| map_sqlx("Health check failed", e))
    }
}

/// Transaction holding the row lock on one license.
///
/// Dropping it without [`LicenseScope::commit`] rolls the transaction back.
struct PgLicenseScope {
    tx: Transaction<'static, Postgres>,
    record: LicenseRecord,
}

#[async_trait]
impl LicenseScope for PgLicenseScope {
    fn record(&self) -> &LicenseRecord {
        &self.record
    }

    async fn count_seats(&mut self) -> StoreResult<u32> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats WHERE license_id = $1")
            .bind(self.record.id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx("Failed to count seats", e))?;
        Ok(count as u32)
    }

    async fn find_seat_by_email(&mut self, email: &str) -> StoreResult<Option<SeatRecord>> {
        sqlx::query_as::<_, SeatRecord>(
            "SELECT * FROM seats WHERE license_id = $1 AND email = LOWER($2)",
        )
        .bind(self.record.id)
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to find seat by email", e))
    }

    async fn bind_machine(
        &mut self,
        machine_id: &str,
        activated_at: DateTime<Utc>,
    ) -> StoreResult<LicenseRecord> {
        let updated = sqlx::query_as::<_, LicenseRecord>(
            "UPDATE licenses SET bound_machine_id = $2, activated_at = $3, \
                status = 'active', updated_at = NOW() \
             WHERE id = $1 AND bound_machine_id IS NULL RETURNING *",
        )
        .bind(self.record.id)
        .bind(machine_id)
        .bind(activated_at)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to bind machine", e))?
        .ok_or_else(|| StoreError::Contention("license was bound concurrently".to_string()))?;

        self.record = updated.clone();
        Ok(updated)
    }

    async fn set_status(&mut self, status: LicenseStatus) -> StoreResult<LicenseRecord> {
        let updated = sqlx::query_as::<_, LicenseRecord>(
            "UPDATE licenses SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(self.record.id)
        .bind(status)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to update license status", e))?;

        self.record = updated.clone();
        Ok(updated)
    }

    async fn insert_seat(&mut self, seat: NewSeat) -> StoreResult<SeatRecord> {
        sqlx::query_as::<_, SeatRecord>(
            "INSERT INTO seats (id, license_id, email, role, display_name, password_hash) \
             VALUES ($1, $2, LOWER($3), $4, $5, $6) RETURNING *",
        )
        .bind(SeatId::new())
        .bind(seat.license_id)
        .bind(&seat.email)
        .bind(seat.role)
        .bind(&seat.display_name)
        .bind(&seat.password_hash)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to insert seat", e))
    }

    async fn remove_seat(&mut self, seat_id: SeatId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM seats WHERE id = $1 AND license_id = $2")
            .bind(seat_id)
            .bind(self.record.id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx("Failed to remove seat", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx("Failed to commit license scope", e))
    }
}
