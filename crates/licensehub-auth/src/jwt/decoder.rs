//! Seat session token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use licensehub_core::config::AuthConfig;
use licensehub_core::error::AppError;

use super::claims::SeatClaims;

/// Validates seat session tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Check signature and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> Result<SeatClaims, AppError> {
        decode::<SeatClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .inspect_err(|e| debug!(error = %e, "Session token rejected"))
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Session has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid session signature")
                }
                _ => AppError::authentication(format!("Session validation failed: {e}")),
            })
    }
}
