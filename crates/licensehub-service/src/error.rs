//! Typed failures of every use case, and their mapping onto [`AppError`].
//!
//! Input errors are raised before the store is touched; policy errors after
//! a read with no mutation; store conflicts are transient.

use thiserror::Error;

use licensehub_auth::VerifyError;
use licensehub_core::error::{AppError, ErrorKind};
use licensehub_database::StoreError;

/// Why a license cannot take new seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusableReason {
    /// Never activated on a machine.
    NotActivated,
    /// Past its expiry.
    Expired,
    /// Revoked by an administrator.
    Revoked,
}

impl std::fmt::Display for UnusableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotActivated => "not activated",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        })
    }
}

/// Failure of `activate`.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// Machine id outside 6..=200 characters.
    #[error("machine id must be between 6 and 200 characters")]
    InvalidMachineId,
    /// Token failed verification.
    #[error("invalid license token: {0}")]
    InvalidToken(VerifyError),
    /// No license has this token's digest.
    #[error("license not found")]
    NotFound,
    /// License is past its expiry.
    #[error("license has expired")]
    Expired,
    /// License was revoked.
    #[error("license has been revoked")]
    Revoked,
    /// License is bound to a different machine.
    #[error("license is bound to another machine")]
    MachineMismatch,
    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of `allocate_seat` / `release_seat`.
#[derive(Debug, Error)]
pub enum SeatError {
    /// Email is not syntactically valid.
    #[error("invalid email address")]
    InvalidEmail,
    /// Password violates the length policy.
    #[error("invalid password: {0}")]
    InvalidPassword(String),
    /// Display name longer than 120 characters.
    #[error("display name must be at most 120 characters")]
    InvalidDisplayName,
    /// License does not exist.
    #[error("license not found")]
    NotFound,
    /// Seat does not exist under the license.
    #[error("seat not found")]
    SeatNotFound,
    /// License cannot take seats right now.
    #[error("license is not usable: {0}")]
    LicenseNotUsable(UnusableReason),
    /// Every seat is taken.
    #[error("seat limit reached ({used}/{limit})")]
    SeatLimitReached {
        /// Seats in use.
        used: u32,
        /// Seat ceiling.
        limit: u32,
    },
    /// The email already holds a seat under this license.
    #[error("a seat with this email already exists")]
    DuplicateSeat,
    /// Password hashing failed.
    #[error(transparent)]
    Internal(AppError),
    /// Storage failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for SeatError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSeat => Self::DuplicateSeat,
            other => Self::Store(other),
        }
    }
}

/// Failure of `revoke`.
#[derive(Debug, Error)]
pub enum RevokeError {
    /// License does not exist.
    #[error("license not found")]
    NotFound,
    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of the read-only queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Token failed verification.
    #[error("invalid license token: {0}")]
    InvalidToken(VerifyError),
    /// License does not exist.
    #[error("license not found")]
    NotFound,
    /// License is bound to a different machine.
    #[error("license is bound to another machine")]
    MachineMismatch,
    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of `issue`.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Request fields out of bounds.
    #[error("invalid license request: {0}")]
    Validation(String),
    /// A license with the same digest already exists.
    #[error("a license with this token already exists")]
    DuplicateDigest,
    /// Storage failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for IssueError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateDigest => Self::DuplicateDigest,
            other => Self::Store(other),
        }
    }
}

/// Failure of seat login and session checks.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Token failed verification.
    #[error("invalid license token: {0}")]
    InvalidToken(VerifyError),
    /// License or seat does not exist.
    #[error("license not found")]
    NotFound,
    /// License is past its expiry.
    #[error("license has expired")]
    Expired,
    /// License was revoked.
    #[error("license has been revoked")]
    Revoked,
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Session token is invalid or expired.
    #[error("invalid session: {0}")]
    InvalidSession(AppError),
    /// Session signing failed.
    #[error(transparent)]
    Internal(AppError),
    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ActivationError> for AppError {
    fn from(err: ActivationError) -> Self {
        let kind = match err {
            ActivationError::InvalidMachineId => ErrorKind::Validation,
            ActivationError::InvalidToken(_) => ErrorKind::Authentication,
            ActivationError::NotFound => ErrorKind::NotFound,
            ActivationError::Expired
            | ActivationError::Revoked
            | ActivationError::MachineMismatch => ErrorKind::License,
            ActivationError::Store(inner) => return AppError::from(inner),
        };
        AppError::new(kind, err.to_string())
    }
}

impl From<SeatError> for AppError {
    fn from(err: SeatError) -> Self {
        let kind = match err {
            SeatError::InvalidEmail
            | SeatError::InvalidPassword(_)
            | SeatError::InvalidDisplayName => ErrorKind::Validation,
            SeatError::NotFound | SeatError::SeatNotFound => ErrorKind::NotFound,
            SeatError::LicenseNotUsable(_) | SeatError::SeatLimitReached { .. } => {
                ErrorKind::License
            }
            SeatError::DuplicateSeat => ErrorKind::Conflict,
            SeatError::Internal(inner) => return inner,
            SeatError::Store(inner) => return AppError::from(inner),
        };
        AppError::new(kind, err.to_string())
    }
}

impl From<RevokeError> for AppError {
    fn from(err: RevokeError) -> Self {
        match err {
            RevokeError::NotFound => AppError::not_found(err.to_string()),
            RevokeError::Store(inner) => AppError::from(inner),
        }
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidToken(_) => AppError::authentication(err.to_string()),
            QueryError::NotFound => AppError::not_found(err.to_string()),
            QueryError::MachineMismatch => AppError::license(err.to_string()),
            QueryError::Store(inner) => AppError::from(inner),
        }
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::Validation(_) => AppError::validation(err.to_string()),
            IssueError::DuplicateDigest => AppError::conflict(err.to_string()),
            IssueError::Store(inner) => AppError::from(inner),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidToken(_)
            | SessionError::InvalidCredentials
            | SessionError::InvalidSession(_) => AppError::authentication(err.to_string()),
            SessionError::NotFound => AppError::not_found(err.to_string()),
            SessionError::Expired | SessionError::Revoked => AppError::license(err.to_string()),
            SessionError::Internal(inner) => inner,
            SessionError::Store(inner) => AppError::from(inner),
        }
    }
}
