use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

use super::AuthError;

/// Source of the issuer's published key set
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// Fetches the JWKS document from the issuer's key endpoint over HTTPS.
/// Requests carry a bounded timeout so a slow issuer cannot stall
/// validation indefinitely.
pub struct HttpKeySource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpKeySource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AuthError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AuthError::KeySetUnavailable(format!("invalid JWKS URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(format!("http client: {}", e)))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("invalid JWKS body: {}", e)))
    }
}

/// A verification key resolved from the issuer key set, paired with the
/// signature algorithms that key type supports.
#[derive(Clone)]
pub struct CachedKey {
    pub key: Arc<DecodingKey>,
    pub algorithms: Vec<Algorithm>,
}

/// In-memory kid -> key map over a [`KeySource`].
///
/// Read-mostly: the common path is a shared read of an already-cached key.
/// On a miss the whole set is re-fetched exactly once for that lookup and
/// swapped in wholesale, which also evicts rotated-out keys. Readers keep
/// using the previous map while a refresh is in flight; duplicate
/// concurrent refreshes are tolerated.
pub struct KeyCache {
    source: Arc<dyn KeySource>,
    keys: RwLock<HashMap<String, CachedKey>>,
}

impl KeyCache {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the key for a token's kid, refreshing from the issuer at
    /// most once if it is not cached.
    pub async fn resolve(&self, kid: &str) -> Result<CachedKey, AuthError> {
        {
            let keys = self.keys.read().await;
            if let Some(cached) = keys.get(kid) {
                return Ok(cached.clone());
            }
        }

        self.refresh().await?;

        let keys = self.keys.read().await;
        keys.get(kid)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    /// Fetch the current key set and replace the cached map
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let set = self.source.fetch().await?;

        let mut next = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                warn!("Skipping published key without a kid");
                continue;
            };
            let Some(algorithms) = allowed_algorithms(jwk) else {
                warn!(kid, "Skipping published key with unsupported type");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    next.insert(
                        kid,
                        CachedKey {
                            key: Arc::new(key),
                            algorithms,
                        },
                    );
                }
                Err(e) => {
                    warn!(kid, error = %e, "Skipping unparseable published key");
                }
            }
        }

        info!(keys = next.len(), "Refreshed issuer key set");

        let mut keys = self.keys.write().await;
        *keys = next;
        Ok(())
    }

    #[cfg(test)]
    pub async fn cached_kids(&self) -> Vec<String> {
        self.keys.read().await.keys().cloned().collect()
    }
}

/// Signature algorithms acceptable for a published key. Only asymmetric
/// algorithms are ever trusted from a key set; `none` and the HMAC family
/// are rejected outright.
fn allowed_algorithms(jwk: &Jwk) -> Option<Vec<Algorithm>> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => Some(vec![
            Algorithm::RS256,
            Algorithm::RS384,
            Algorithm::RS512,
        ]),
        AlgorithmParameters::EllipticCurve(params) => match params.curve {
            EllipticCurve::P256 => Some(vec![Algorithm::ES256]),
            EllipticCurve::P384 => Some(vec![Algorithm::ES384]),
            _ => None,
        },
        AlgorithmParameters::OctetKeyPair(_) => Some(vec![Algorithm::EdDSA]),
        _ => None,
    }
}
