//! Shared helpers for validator tests: Ed25519 key pairs, signed tokens,
//! crafted attack tokens, and an in-memory [`KeySource`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::SigningKey;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rand_core::OsRng;
use serde_json::{json, Value};

use super::keys::KeySource;
use super::AuthError;

/// Generates a fresh Ed25519 key pair.
///
/// Returns `(pkcs8_der, public_key_base64url)`: the private key in PKCS#8
/// DER form for [`EncodingKey::from_ed_der`], and the 32-byte public key
/// base64url-encoded for a JWK `x` parameter.
pub fn generate_keypair() -> (Vec<u8>, String) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public_b64 = URL_SAFE_NO_PAD.encode(signing_key.verifying_key().to_bytes());

    let mut pkcs8_der = vec![
        0x30, 0x2e, // SEQUENCE, 46 bytes
        0x02, 0x01, 0x00, // INTEGER version 0
        0x30, 0x05, // SEQUENCE, 5 bytes (algorithm identifier)
        0x06, 0x03, 0x2b, 0x65, 0x70, // OID 1.3.101.112 (Ed25519)
        0x04, 0x22, // OCTET STRING, 34 bytes
        0x04, 0x20, // OCTET STRING, 32 bytes (the actual key)
    ];
    pkcs8_der.extend_from_slice(&signing_key.to_bytes());

    (pkcs8_der, public_b64)
}

/// Builds a JWKS document from `(kid, public_key_base64url)` pairs
pub fn jwk_set(entries: &[(&str, &str)]) -> JwkSet {
    let keys: Vec<Value> = entries
        .iter()
        .map(|(kid, x)| {
            json!({
                "kty": "OKP",
                "crv": "Ed25519",
                "x": x,
                "kid": kid,
                "alg": "EdDSA",
                "use": "sig",
            })
        })
        .collect();
    serde_json::from_value(json!({ "keys": keys })).expect("valid jwk set")
}

/// Signs a token over the given claims with an Ed25519 key
pub fn sign_token(pkcs8_der: &[u8], kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = Some(kid.to_string());
    jsonwebtoken::encode(&header, claims, &EncodingKey::from_ed_der(pkcs8_der))
        .expect("failed to encode test token")
}

/// Standard claim set for a token that should pass validation
pub fn valid_claims(issuer: &str, audience: &str, uid: &str) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": issuer,
        "aud": audience,
        "sub": format!("user:{}", uid),
        "uid": uid,
        "exp": now + 3600,
        "iat": now,
    })
}

/// Builds a raw `{header}.{payload}.` token with an empty signature, for
/// testing rejection of `alg: none` style attacks.
pub fn craft_raw_token(header: &Value, payload: &Value) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).expect("header json"));
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).expect("payload json"));
    format!("{header_b64}.{payload_b64}.")
}

/// In-memory key source with a swappable set and a fetch counter, so
/// tests can assert exactly how many issuer round-trips occurred.
pub struct StaticKeySource {
    set: Mutex<JwkSet>,
    fetches: AtomicUsize,
}

impl StaticKeySource {
    pub fn new(set: JwkSet) -> Self {
        Self {
            set: Mutex::new(set),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn replace(&self, set: JwkSet) {
        *self.set.lock().expect("lock") = set;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.set.lock().expect("lock").clone())
    }
}

/// Key source that always fails, simulating an unreachable issuer
pub struct UnreachableKeySource;

#[async_trait]
impl KeySource for UnreachableKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        Err(AuthError::KeySetUnavailable("connection refused".to_string()))
    }
}
