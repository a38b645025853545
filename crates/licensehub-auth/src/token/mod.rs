//! License tokens: `{prefix}.{base64url(payload-json)}.{signature}`.
//!
//! Everything here is a pure function of its inputs. Storage is never
//! consulted; whether a verified token refers to a known license is the
//! caller's concern.

pub mod codec;
pub mod digest;
pub mod error;
pub mod payload;
pub mod signer;

pub use digest::digest;
pub use error::VerifyError;
pub use payload::{CURRENT_SCHEMA_VERSION, LicensePayload};
pub use signer::LicenseSigner;
