use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;

use auth::{HttpKeySource, KeyCache, TokenValidator};
use database::SessionStore;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_ISSUER, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Conference API in {:?} mode", config.environment);

    let app = app(config).unwrap_or_else(|e| panic!("failed to initialize: {}", e));

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Conference API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

/// Assemble the application: validator and store are constructed here with
/// their configuration and handed to the router explicitly.
fn app(config: &config::AppConfig) -> Result<Router, Box<dyn std::error::Error>> {
    let key_source = Arc::new(HttpKeySource::new(
        &config.auth.jwks_endpoint(),
        Duration::from_secs(config.auth.fetch_timeout_secs),
    )?);
    let validator = Arc::new(TokenValidator::new(
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        KeyCache::new(key_source),
    ));

    let pool = database::connect(&config.database)?;
    let sessions = SessionStore::new(pool);

    Ok(Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Authenticated API
        .merge(session_routes(validator))
        // Global middleware
        .layer(Extension(sessions))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http()))
}

fn session_routes(validator: Arc<TokenValidator>) -> Router {
    Router::new()
        .route("/api/sessions", post(handlers::sessions::create))
        .layer(axum::middleware::from_fn_with_state(
            validator,
            middleware::bearer_auth,
        ))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Conference API",
            "version": version,
            "description": "Conference session submission API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "sessions": "POST /api/sessions (bearer token required)",
            }
        }
    }))
}

async fn health(Extension(sessions): Extension<SessionStore>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match sessions.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
