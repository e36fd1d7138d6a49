use jsonwebtoken::{decode, decode_header, Validation};
use serde_json::{Map, Value};

use super::identity::Identity;
use super::keys::KeyCache;
use super::AuthError;

/// Verifies bearer tokens against the trusted issuer's published keys.
///
/// Checks run in order: token structure, key resolution (with a single
/// cache refresh on miss), algorithm policy, then signature plus exact
/// issuer, exact audience, and expiry with zero leeway. Any failure is
/// terminal for the request.
pub struct TokenValidator {
    issuer: String,
    audience: String,
    keys: KeyCache,
}

impl TokenValidator {
    pub fn new(issuer: String, audience: String, keys: KeyCache) -> Self {
        Self {
            issuer,
            audience,
            keys,
        }
    }

    pub async fn validate(&self, raw_token: &str) -> Result<Identity, AuthError> {
        let header =
            decode_header(raw_token).map_err(|e| AuthError::MalformedToken(e.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::MalformedToken("token header has no kid".to_string()))?;

        let cached = self.keys.resolve(&kid).await?;

        // The header's alg must be one the resolved key type supports,
        // which also rules out HMAC/none substitution.
        if !cached.algorithms.contains(&header.alg) {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);

        let data = decode::<Map<String, Value>>(raw_token, &cached.key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(Identity::new(data.claims))
    }
}
