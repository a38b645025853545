//! Seat-user login and session checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use licensehub_auth::{JwtDecoder, JwtEncoder, LicenseSigner, PasswordHasher, SeatClaims, digest};
use licensehub_database::EntitlementStore;
use licensehub_entity::license::LicenseSummary;
use licensehub_entity::seat::SeatRecord;

use crate::error::{QueryError, SessionError};
use crate::query::{EntitlementQueryService, EntitlementSnapshot};

/// A logged-in seat.
#[derive(Debug, Clone, Serialize)]
pub struct SeatSession {
    /// Signed session token.
    pub access_token: String,
    /// Session expiry.
    pub expires_at: DateTime<Utc>,
    /// The seat.
    pub seat: SeatRecord,
    /// The license the seat belongs to.
    pub license: LicenseSummary,
}

/// Issues and checks seat sessions.
#[derive(Debug, Clone)]
pub struct SeatSessionService {
    store: Arc<dyn EntitlementStore>,
    signer: Arc<LicenseSigner>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    query: EntitlementQueryService,
}

impl SeatSessionService {
    /// Creates a new session service.
    pub fn new(
        store: Arc<dyn EntitlementStore>,
        signer: Arc<LicenseSigner>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        let query = EntitlementQueryService::new(Arc::clone(&store), Arc::clone(&signer));
        Self {
            store,
            signer,
            hasher,
            encoder,
            decoder,
            query,
        }
    }

    /// Log a seat in. An unknown email and a wrong password are
    /// indistinguishable to the caller.
    pub async fn login(
        &self,
        token: &str,
        email: &str,
        password: &str,
    ) -> Result<SeatSession, SessionError> {
        self.signer.verify(token).map_err(SessionError::InvalidToken)?;

        let license = self
            .store
            .find_by_digest(&digest(token))
            .await?
            .ok_or(SessionError::NotFound)?;
        if license.is_revoked() {
            return Err(SessionError::Revoked);
        }
        if license.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired);
        }

        let email = email.trim().to_lowercase();
        let seat = self.store.find_seat_by_email(license.id, &email).await?;
        let verified = match &seat {
            Some(seat) => self.hasher.verify_password(password, &seat.password_hash),
            None => self.hasher.verify_absent(password),
        };
        let Some(seat) = seat.filter(|_| verified) else {
            warn!(license_id = %license.id, "Seat login failed");
            return Err(SessionError::InvalidCredentials);
        };

        let session = self
            .encoder
            .issue(&seat, &license)
            .map_err(SessionError::Internal)?;

        info!(license_id = %license.id, seat_id = %seat.id, role = %seat.role, "Seat logged in");

        Ok(SeatSession {
            access_token: session.access_token,
            expires_at: session.expires_at,
            license: LicenseSummary::from(&license),
            seat,
        })
    }

    /// Check a session token's signature and expiry.
    pub fn authenticate(&self, access_token: &str) -> Result<SeatClaims, SessionError> {
        self.decoder
            .decode(access_token)
            .map_err(SessionError::InvalidSession)
    }

    /// The seat behind a session, with its license's current entitlements.
    pub async fn whoami(
        &self,
        access_token: &str,
    ) -> Result<(SeatRecord, EntitlementSnapshot), SessionError> {
        let claims = self.authenticate(access_token)?;

        let seat = self
            .store
            .find_seat_by_email(claims.license_id, &claims.email)
            .await?
            .filter(|seat| seat.id == claims.sub)
            .ok_or(SessionError::NotFound)?;

        let snapshot = self
            .query
            .describe(claims.license_id)
            .await
            .map_err(|e| match e {
                QueryError::Store(inner) => SessionError::Store(inner),
                _ => SessionError::NotFound,
            })?;

        Ok((seat, snapshot))
    }
}
