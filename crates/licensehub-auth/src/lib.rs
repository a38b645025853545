//! # licensehub-auth
//!
//! Stateless cryptography for LicenseHub.
//!
//! ## Modules
//!
//! - `token`: license token codec, HMAC signing/verification, storage digest
//! - `password`: Argon2id seat password hashing and length policy
//! - `jwt`: seat session token creation and validation

pub mod jwt;
pub mod password;
pub mod token;

pub use jwt::{JwtDecoder, JwtEncoder, SeatClaims};
pub use password::{PasswordHasher, PasswordPolicy};
pub use token::{LicensePayload, LicenseSigner, VerifyError, digest};
