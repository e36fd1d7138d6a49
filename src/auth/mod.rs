pub mod identity;
pub mod keys;
pub mod validator;

#[cfg(test)]
pub mod testutil;

pub use identity::Identity;
pub use keys::{HttpKeySource, KeyCache, KeySource};
pub use validator::TokenValidator;

use thiserror::Error;

/// Token validation failures. Every variant surfaces to clients as a bare
/// 401; the variant only drives server-side logging.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or malformed Authorization header")]
    MissingCredentials,

    #[error("Malformed bearer token: {0}")]
    MalformedToken(String),

    #[error("No signing key matches kid '{0}'")]
    UnknownKey(String),

    #[error("Algorithm '{0}' is not accepted")]
    UnsupportedAlgorithm(String),

    #[error("Token rejected: {0}")]
    InvalidToken(String),

    #[error("Issuer key set unavailable: {0}")]
    KeySetUnavailable(String),
}
