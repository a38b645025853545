//! License signing configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// License token signing configuration.
///
/// The master key is injected into the signer explicitly; nothing in the
/// workspace reads it from a global.
#[derive(Clone, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// HMAC master key used to sign and verify license tokens.
    pub master_key: String,
    /// Literal first segment of every token.
    #[serde(default = "default_prefix")]
    pub token_prefix: String,
    /// Product name embedded in issued payloads.
    #[serde(default = "default_product")]
    pub product: String,
    /// Identifier of the signing key, embedded in issued payloads.
    #[serde(default = "default_key_id")]
    pub key_id: String,
}

impl LicenseConfig {
    /// Ensure the signing material is usable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.master_key.trim().is_empty() {
            return Err(AppError::configuration("license.master_key must be set"));
        }
        if self.token_prefix.is_empty() || self.token_prefix.contains('.') {
            return Err(AppError::configuration(
                "license.token_prefix must be non-empty and must not contain '.'",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LicenseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseConfig")
            .field("master_key", &"****")
            .field("token_prefix", &self.token_prefix)
            .field("product", &self.product)
            .field("key_id", &self.key_id)
            .finish()
    }
}

fn default_prefix() -> String {
    "EL".to_string()
}

fn default_product() -> String {
    "EasyLotto".to_string()
}

fn default_key_id() -> String {
    "k1".to_string()
}
