//! Token verification failures.

use thiserror::Error;

use licensehub_core::error::AppError;

/// Why a license token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Not exactly three dot-separated segments.
    #[error("license token is not in PREFIX.PAYLOAD.SIGNATURE form")]
    MalformedFormat,
    /// First segment is not the configured prefix.
    #[error("license token has an unexpected prefix")]
    WrongPrefix,
    /// Signature does not match the payload.
    #[error("license token signature is invalid")]
    BadSignature,
    /// Payload is not base64url JSON of the expected schema.
    #[error("license token payload is malformed")]
    MalformedPayload,
    /// Payload was produced by a newer schema.
    #[error("license payload schema version {found} is not supported (max {supported})")]
    UnsupportedVersion {
        /// Version found in the payload.
        found: u32,
        /// Highest version this build understands.
        supported: u32,
    },
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        AppError::license(err.to_string())
    }
}
