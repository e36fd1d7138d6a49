use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Trusted issuer settings for bearer token validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    /// Explicit JWKS endpoint; when unset, derived as `{issuer}/v1/keys`
    pub jwks_url: Option<String>,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl AuthConfig {
    /// Resolved key endpoint for the configured issuer
    pub fn jwks_endpoint(&self) -> String {
        match &self.jwks_url {
            Some(url) => url.clone(),
            None => format!("{}/v1/keys", self.issuer.trim_end_matches('/')),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Auth overrides
        if let Ok(v) = env::var("AUTH_ISSUER") {
            self.auth.issuer = v;
        }
        if let Ok(v) = env::var("AUTH_AUDIENCE") {
            self.auth.audience = v;
        }
        if let Ok(v) = env::var("AUTH_JWKS_URL") {
            self.auth.jwks_url = Some(v);
        }
        if let Ok(v) = env::var("AUTH_FETCH_TIMEOUT_SECS") {
            self.auth.fetch_timeout_secs = v.parse().unwrap_or(self.auth.fetch_timeout_secs);
        }

        // Database overrides
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.database = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            auth: AuthConfig {
                issuer: "https://dev-541900.okta.com/oauth2/default".to_string(),
                audience: "api://default".to_string(),
                jwks_url: None,
                fetch_timeout_secs: 10,
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                database: "conference".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            auth: AuthConfig {
                issuer: "https://dev-541900.okta.com/oauth2/default".to_string(),
                audience: "api://default".to_string(),
                jwks_url: None,
                fetch_timeout_secs: 5,
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                user: "postgres".to_string(),
                password: String::new(),
                database: "conference".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            auth: AuthConfig {
                issuer: "https://dev-541900.okta.com/oauth2/default".to_string(),
                audience: "api://default".to_string(),
                jwks_url: None,
                fetch_timeout_secs: 5,
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                user: "postgres".to_string(),
                password: String::new(),
                database: "conference".to_string(),
                max_connections: 50,
                acquire_timeout_secs: 5,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
