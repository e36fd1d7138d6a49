use serde_json::{Map, Value};

/// Authenticated identity produced by token validation.
///
/// Carries every claim from the verified token. Only `uid` is consumed by
/// the session write path; the rest is opaque context.
#[derive(Clone, Debug)]
pub struct Identity {
    claims: Map<String, Value>,
}

impl Identity {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    /// Look up a string-typed claim by name. Non-string claims resolve to
    /// None rather than being coerced.
    ///
    /// If the token payload repeats a claim name, the last occurrence wins
    /// (`serde_json::Map` keeps the last value for a duplicate JSON key).
    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// The stable user identifier, when the issuer supplied one
    pub fn uid(&self) -> Option<&str> {
        self.claim("uid")
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }
}
