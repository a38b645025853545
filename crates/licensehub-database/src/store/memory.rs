//! In-memory entitlement store for single-node deployments and tests.
//!
//! Each license id owns a `tokio::sync::Mutex`; a scope holds the owned
//! guard and stages its mutations, which are applied to the shared tables
//! only on commit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use licensehub_core::types::{LicenseId, SeatId};
use licensehub_entity::license::{LicenseRecord, LicenseStatus, NewLicense};
use licensehub_entity::seat::{NewSeat, SeatRecord};

use super::{EntitlementStore, LicenseScope, StoreError, StoreResult};

/// Committed rows.
#[derive(Debug, Default)]
struct Tables {
    licenses: HashMap<LicenseId, LicenseRecord>,
    seats: Vec<SeatRecord>,
}

impl Tables {
    fn seats_of(&self, license_id: LicenseId) -> impl Iterator<Item = &SeatRecord> {
        self.seats.iter().filter(move |s| s.license_id == license_id)
    }
}

/// Entitlement store held entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntitlementStore {
    tables: Arc<RwLock<Tables>>,
    row_locks: Arc<DashMap<LicenseId, Arc<Mutex<()>>>>,
}

impl MemoryEntitlementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntitlementStore for MemoryEntitlementStore {
    async fn find_by_digest(&self, digest: &str) -> StoreResult<Option<LicenseRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .licenses
            .values()
            .find(|l| l.license_token_digest == digest)
            .cloned())
    }

    async fn find_by_id(&self, id: LicenseId) -> StoreResult<Option<LicenseRecord>> {
        Ok(self.tables.read().await.licenses.get(&id).cloned())
    }

    async fn create(&self, license: NewLicense) -> StoreResult<LicenseRecord> {
        let mut tables = self.tables.write().await;
        if tables
            .licenses
            .values()
            .any(|l| l.license_token_digest == license.license_token_digest)
        {
            return Err(StoreError::DuplicateDigest);
        }

        let now = Utc::now();
        let record = LicenseRecord {
            id: LicenseId::new(),
            license_token_digest: license.license_token_digest,
            customer_name: license.customer_name,
            plan: license.plan,
            expires_at: license.expires_at,
            seat_limit: license.seat_limit,
            status: LicenseStatus::Issued,
            bound_machine_id: None,
            activated_at: None,
            note: license.note,
            created_at: now,
            updated_at: now,
        };
        tables.licenses.insert(record.id, record.clone());
        Ok(record)
    }

    async fn count_seats(&self, license_id: LicenseId) -> StoreResult<u32> {
        Ok(self.tables.read().await.seats_of(license_id).count() as u32)
    }

    async fn list_seats(&self, license_id: LicenseId) -> StoreResult<Vec<SeatRecord>> {
        let tables = self.tables.read().await;
        let mut seats: Vec<SeatRecord> = tables.seats_of(license_id).cloned().collect();
        seats.sort_by_key(|s| s.created_at);
        Ok(seats)
    }

    async fn find_seat_by_email(
        &self,
        license_id: LicenseId,
        email: &str,
    ) -> StoreResult<Option<SeatRecord>> {
        let email = email.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.seats_of(license_id).find(|s| s.email == email).cloned())
    }

    async fn lock(&self, license_id: LicenseId) -> StoreResult<Option<Box<dyn LicenseScope>>> {
        // Row locks exist only for stored licenses.
        if !self.tables.read().await.licenses.contains_key(&license_id) {
            return Ok(None);
        }
        let row_lock = self.row_locks.entry(license_id).or_default().clone();
        let guard = row_lock.lock_owned().await;

        let Some(record) = self.tables.read().await.licenses.get(&license_id).cloned() else {
            return Ok(None);
        };

        debug!(license_id = %license_id, "License row locked (memory)");
        Ok(Some(Box::new(MemoryLicenseScope {
            tables: Arc::clone(&self.tables),
            _guard: guard,
            record,
            record_dirty: false,
            inserted: Vec::new(),
            removed: Vec::new(),
        })))
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

/// Staged mutations on one license, applied on commit.
struct MemoryLicenseScope {
    tables: Arc<RwLock<Tables>>,
    _guard: OwnedMutexGuard<()>,
    record: LicenseRecord,
    record_dirty: bool,
    inserted: Vec<SeatRecord>,
    removed: Vec<SeatId>,
}

impl MemoryLicenseScope {
    fn committed_visible<'a>(&'a self, tables: &'a Tables) -> impl Iterator<Item = &'a SeatRecord> {
        tables
            .seats_of(self.record.id)
            .filter(move |s| !self.removed.contains(&s.id))
    }
}

#[async_trait]
impl LicenseScope for MemoryLicenseScope {
    fn record(&self) -> &LicenseRecord {
        &self.record
    }

    async fn count_seats(&mut self) -> StoreResult<u32> {
        let tables = self.tables.read().await;
        let committed = self.committed_visible(&tables).count();
        Ok((committed + self.inserted.len()) as u32)
    }

    async fn find_seat_by_email(&mut self, email: &str) -> StoreResult<Option<SeatRecord>> {
        let email = email.to_lowercase();
        if let Some(seat) = self.inserted.iter().find(|s| s.email == email) {
            return Ok(Some(seat.clone()));
        }
        let tables = self.tables.read().await;
        Ok(self
            .committed_visible(&tables)
            .find(|s| s.email == email)
            .cloned())
    }

    async fn bind_machine(
        &mut self,
        machine_id: &str,
        activated_at: DateTime<Utc>,
    ) -> StoreResult<LicenseRecord> {
        if self.record.bound_machine_id.is_some() {
            return Err(StoreError::Contention(
                "license was bound concurrently".to_string(),
            ));
        }
        self.record.bound_machine_id = Some(machine_id.to_string());
        self.record.activated_at = Some(activated_at);
        self.record.status = LicenseStatus::Active;
        self.record.updated_at = Utc::now();
        self.record_dirty = true;
        Ok(self.record.clone())
    }

    async fn set_status(&mut self, status: LicenseStatus) -> StoreResult<LicenseRecord> {
        self.record.status = status;
        self.record.updated_at = Utc::now();
        self.record_dirty = true;
        Ok(self.record.clone())
    }

    async fn insert_seat(&mut self, seat: NewSeat) -> StoreResult<SeatRecord> {
        let email = seat.email.to_lowercase();
        if self.find_seat_by_email(&email).await?.is_some() {
            return Err(StoreError::DuplicateSeat);
        }

        let record = SeatRecord {
            id: SeatId::new(),
            license_id: seat.license_id,
            email,
            role: seat.role,
            display_name: seat.display_name,
            password_hash: seat.password_hash,
            created_at: Utc::now(),
        };
        self.inserted.push(record.clone());
        Ok(record)
    }

    async fn remove_seat(&mut self, seat_id: SeatId) -> StoreResult<bool> {
        if let Some(pos) = self.inserted.iter().position(|s| s.id == seat_id) {
            self.inserted.remove(pos);
            return Ok(true);
        }
        if self.removed.contains(&seat_id) {
            return Ok(false);
        }
        let exists = {
            let tables = self.tables.read().await;
            tables.seats_of(self.record.id).any(|s| s.id == seat_id)
        };
        if exists {
            self.removed.push(seat_id);
        }
        Ok(exists)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if self.record_dirty {
            tables.licenses.insert(self.record.id, self.record.clone());
        }
        tables.seats.retain(|s| !self.removed.contains(&s.id));
        tables.seats.extend(self.inserted.iter().cloned());
        Ok(())
    }
}
