//! Integration tests for license token signing, verification and digests.

mod helpers;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};

use licensehub_auth::{LicenseSigner, VerifyError, digest};
use licensehub_entity::license::LicensePlan;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn signer() -> LicenseSigner {
    LicenseSigner::new(&helpers::test_config().license).expect("signer")
}

/// Replace the character at `index` with a different base64url character.
fn flip(token: &str, index: usize) -> String {
    let mut bytes = token.as_bytes().to_vec();
    let original = bytes[index];
    let pos = ALPHABET.iter().position(|&c| c == original).unwrap_or(0);
    bytes[index] = ALPHABET[(pos + 1) % ALPHABET.len()];
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_issue_verify_returns_payload() {
    let signer = signer();
    let now = Utc::now();
    let payload = signer.new_payload(LicensePlan::Pro, 3, now, now + Duration::days(365), "");

    let token = signer.issue(&payload);
    assert_eq!(signer.verify(&token).unwrap(), payload);
    assert_eq!(payload.product, "EasyLotto");
    assert_eq!(payload.issuer_key_id, "k1");
}

#[test]
fn test_every_single_character_flip_is_rejected() {
    let signer = signer();
    let now = Utc::now();
    let payload = signer.new_payload(LicensePlan::Basic, 1, now, now + Duration::days(30), "x");
    let token = signer.issue(&payload);

    let payload_start = token.find('.').unwrap() + 1;
    for index in payload_start..token.len() {
        if token.as_bytes()[index] == b'.' {
            continue;
        }
        let tampered = flip(&token, index);
        let result = signer.verify(&tampered);
        assert!(
            matches!(
                result,
                Err(VerifyError::BadSignature) | Err(VerifyError::MalformedPayload)
            ),
            "flip at {index} produced {result:?}"
        );
    }
}

#[test]
fn test_prefix_and_shape_errors() {
    let signer = signer();
    let now = Utc::now();
    let token = signer.issue(&signer.new_payload(LicensePlan::Basic, 1, now, now, ""));

    assert_eq!(
        signer.verify(&format!("XX{}", &token[2..])),
        Err(VerifyError::WrongPrefix)
    );
    assert_eq!(signer.verify("not-a-token"), Err(VerifyError::MalformedFormat));
    assert_eq!(
        signer.verify(&format!("{token}.extra")),
        Err(VerifyError::MalformedFormat)
    );
}

#[test]
fn test_newer_schema_version_is_reported() {
    let signer = signer();
    let body = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "schemaVersion": 7, "somethingNew": [1, 2, 3] }).to_string(),
    );
    let token = format!("EL.{body}.{}", signer.sign(&body));

    assert_eq!(
        signer.verify(&token),
        Err(VerifyError::UnsupportedVersion {
            found: 7,
            supported: 1
        })
    );
}

#[test]
fn test_signed_garbage_is_malformed_payload() {
    let signer = signer();
    let body = URL_SAFE_NO_PAD.encode(b"{not json");
    let token = format!("EL.{body}.{}", signer.sign(&body));
    assert_eq!(signer.verify(&token), Err(VerifyError::MalformedPayload));
}

#[test]
fn test_digest_is_stable_and_distinct() {
    let signer = signer();
    let now = Utc::now();
    let a = signer.issue(&signer.new_payload(LicensePlan::Pro, 3, now, now, "a"));
    let b = signer.issue(&signer.new_payload(LicensePlan::Pro, 3, now, now, "b"));

    assert_eq!(digest(&a), digest(&a));
    assert_ne!(digest(&a), digest(&b));
}
