//! # licensehub-database
//!
//! PostgreSQL connection management and the entitlement store: the only
//! component of LicenseHub that touches durable state.

pub mod connection;
pub mod migration;
pub mod store;

pub use connection::DatabasePool;
pub use store::{
    EntitlementStore, LicenseScope, MemoryEntitlementStore, PgEntitlementStore, StoreError,
    StoreResult, with_exclusive_lock,
};
