//! Seat password length policy.

use licensehub_core::config::AuthConfig;

/// Argon2 accepts longer input, but the seat API caps passwords here.
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Length bounds applied to new seat passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    /// Creates a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Describe the first violated bound, if any.
    pub fn check(&self, password: &str) -> Result<(), String> {
        let len = password.chars().count();
        if len < self.min_length {
            return Err(format!(
                "password must be at least {} characters long",
                self.min_length
            ));
        }
        if len > MAX_PASSWORD_LENGTH {
            return Err(format!(
                "password must be at most {MAX_PASSWORD_LENGTH} characters long"
            ));
        }
        Ok(())
    }
}
