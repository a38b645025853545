//! Payload ⇄ URL-safe text.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use super::error::VerifyError;
use super::payload::{CURRENT_SCHEMA_VERSION, LicensePayload};

/// Only the version field, read before the full decode so that payloads
/// from a newer schema are reported as version errors.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionProbe {
    schema_version: u32,
}

/// Encode a payload as base64url (no padding) of its JSON.
pub fn encode(payload: &LicensePayload) -> String {
    // Serializing plain strings, numbers and timestamps cannot fail.
    let json = serde_json::to_vec(payload).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode the payload segment of a token.
pub fn decode(text: &str) -> Result<LicensePayload, VerifyError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|_| VerifyError::MalformedPayload)?;

    let probe: VersionProbe =
        serde_json::from_slice(&bytes).map_err(|_| VerifyError::MalformedPayload)?;
    if probe.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(VerifyError::UnsupportedVersion {
            found: probe.schema_version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    if probe.schema_version == 0 {
        return Err(VerifyError::MalformedPayload);
    }

    serde_json::from_slice(&bytes).map_err(|_| VerifyError::MalformedPayload)
}
