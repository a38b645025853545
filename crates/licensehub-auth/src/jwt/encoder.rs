//! Seat session token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use licensehub_core::config::AuthConfig;
use licensehub_core::error::AppError;
use licensehub_entity::license::LicenseRecord;
use licensehub_entity::seat::SeatRecord;

use super::claims::SeatClaims;

/// Signs seat session tokens (HS256).
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_hours", &self.ttl_hours)
            .finish_non_exhaustive()
    }
}

/// A signed session token and its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// Encoded JWT.
    pub access_token: String,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates an encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_hours: config.session_ttl_hours as i64,
        }
    }

    /// Issue a session token for a seat of a license.
    pub fn issue(&self, seat: &SeatRecord, license: &LicenseRecord) -> Result<SessionToken, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.ttl_hours);

        let claims = SeatClaims {
            sub: seat.id,
            email: seat.email.clone(),
            role: seat.role,
            license_id: license.id,
            plan: license.plan,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;

        Ok(SessionToken {
            access_token,
            expires_at,
        })
    }
}
