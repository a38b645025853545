//! Wires every service over one entitlement store.

use std::sync::Arc;

use licensehub_auth::{JwtDecoder, JwtEncoder, LicenseSigner, PasswordHasher, PasswordPolicy};
use licensehub_core::config::AppConfig;
use licensehub_core::error::AppError;
use licensehub_database::EntitlementStore;

use crate::activation::ActivationCoordinator;
use crate::issuance::IssuanceService;
use crate::query::EntitlementQueryService;
use crate::session::SeatSessionService;

/// The full service graph.
#[derive(Debug, Clone)]
pub struct Services {
    /// License issuance.
    pub issuance: IssuanceService,
    /// Activation, seats and revocation.
    pub coordinator: ActivationCoordinator,
    /// Read-only queries.
    pub query: EntitlementQueryService,
    /// Seat login and sessions.
    pub sessions: SeatSessionService,
}

impl Services {
    /// Build every service from configuration over the given store.
    pub fn new(config: &AppConfig, store: Arc<dyn EntitlementStore>) -> Result<Self, AppError> {
        config.validate()?;

        let signer = Arc::new(LicenseSigner::new(&config.license)?);
        let hasher = Arc::new(PasswordHasher::new());
        let policy = PasswordPolicy::new(&config.auth);
        let encoder = Arc::new(JwtEncoder::new(&config.auth));
        let decoder = Arc::new(JwtDecoder::new(&config.auth));

        Ok(Self {
            issuance: IssuanceService::new(Arc::clone(&store), Arc::clone(&signer)),
            coordinator: ActivationCoordinator::new(
                Arc::clone(&store),
                Arc::clone(&signer),
                Arc::clone(&hasher),
                policy,
            ),
            query: EntitlementQueryService::new(Arc::clone(&store), Arc::clone(&signer)),
            sessions: SeatSessionService::new(store, signer, hasher, encoder, decoder),
        })
    }
}
