//! HMAC-SHA256 signing and constant-time verification of license tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use licensehub_core::config::LicenseConfig;
use licensehub_core::error::AppError;
use licensehub_entity::license::LicensePlan;

use super::codec;
use super::error::VerifyError;
use super::payload::{CURRENT_SCHEMA_VERSION, LicensePayload};

type HmacSha256 = Hmac<Sha256>;

/// Length of the signature segment, in base64url characters.
pub const SIGNATURE_LEN: usize = 32;

/// Signs and verifies license tokens with an injected master key.
#[derive(Clone)]
pub struct LicenseSigner {
    mac: HmacSha256,
    prefix: String,
    product: String,
    key_id: String,
}

impl std::fmt::Debug for LicenseSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseSigner")
            .field("prefix", &self.prefix)
            .field("product", &self.product)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl LicenseSigner {
    /// Creates a signer from the license configuration.
    pub fn new(config: &LicenseConfig) -> Result<Self, AppError> {
        config.validate()?;
        let mac = HmacSha256::new_from_slice(config.master_key.as_bytes())
            .map_err(|e| AppError::configuration(format!("Invalid license master key: {e}")))?;

        Ok(Self {
            mac,
            prefix: config.token_prefix.clone(),
            product: config.product.clone(),
            key_id: config.key_id.clone(),
        })
    }

    /// Build a current-schema payload stamped with this signer's product and key id.
    pub fn new_payload(
        &self,
        plan: LicensePlan,
        seat_limit: u32,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        note: impl Into<String>,
    ) -> LicensePayload {
        LicensePayload {
            schema_version: CURRENT_SCHEMA_VERSION,
            product: self.product.clone(),
            plan,
            seat_limit,
            issued_at,
            expires_at,
            issuer_key_id: self.key_id.clone(),
            note: note.into(),
        }
    }

    /// Signature of an encoded payload: base64url HMAC, truncated.
    pub fn sign(&self, encoded_payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(encoded_payload.as_bytes());
        let mut sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        sig.truncate(SIGNATURE_LEN);
        sig
    }

    /// Produce the full token for a payload.
    pub fn issue(&self, payload: &LicensePayload) -> String {
        let body = codec::encode(payload);
        let sig = self.sign(&body);
        format!("{}.{}.{}", self.prefix, body, sig)
    }

    /// Check a token's shape, prefix and signature, then decode its payload.
    pub fn verify(&self, token: &str) -> Result<LicensePayload, VerifyError> {
        let mut parts = token.split('.');
        let (Some(prefix), Some(body), Some(sig), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VerifyError::MalformedFormat);
        };

        if prefix != self.prefix {
            return Err(VerifyError::WrongPrefix);
        }

        let expected = self.sign(body);
        if !bool::from(expected.as_bytes().ct_eq(sig.as_bytes())) {
            return Err(VerifyError::BadSignature);
        }

        codec::decode(body)
    }
}
