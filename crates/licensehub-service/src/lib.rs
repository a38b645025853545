//! # licensehub-service
//!
//! Use cases over the entitlement store. Services hold no mutable state of
//! their own; every dependency is injected at construction via `Arc`.

pub mod activation;
pub mod container;
pub mod error;
pub mod issuance;
pub mod query;
pub mod session;

pub use activation::{
    ActivatedLicense, ActivationCoordinator, ActivationOutcome, NewSeatRequest, SeatAllocation,
};
pub use container::Services;
pub use error::{
    ActivationError, IssueError, QueryError, RevokeError, SeatError, SessionError, UnusableReason,
};
pub use issuance::{IssuanceService, IssueLicense, IssuedLicense};
pub use query::{EntitlementQueryService, EntitlementSnapshot};
pub use session::{SeatSession, SeatSessionService};
