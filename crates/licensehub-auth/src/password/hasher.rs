//! Argon2id password hashing and verification.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use licensehub_core::error::AppError;

/// Hash verified in place of a missing account, built once with the same
/// parameters as real seat hashes.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| PasswordHasher.hash_password("licensehub-absent-seat").ok())
        .as_deref()
}

/// Hashes and verifies seat passwords with Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Check a plaintext password against a stored PHC hash string.
    ///
    /// A hash that cannot be parsed counts as a mismatch so that a corrupt
    /// row cannot be told apart from a wrong password.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend one full verification on a login whose account does not exist,
    /// so it costs the same as a wrong password. Always `false`.
    pub fn verify_absent(&self, password: &str) -> bool {
        if let Some(hash) = dummy_hash() {
            let _ = self.verify_password(password, hash);
        }
        false
    }
}
