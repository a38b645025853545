//! # licensehub-entity
//!
//! Entity models for LicenseHub. Every struct in this crate represents a
//! database row or a domain value object. Persisted entities additionally
//! derive `sqlx::FromRow`.

pub mod license;
pub mod seat;
