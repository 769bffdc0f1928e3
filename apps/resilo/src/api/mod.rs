//! # Resilo HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET  /health` - Health check
//! - `GET  /status` - Store status and configured scale
//! - `GET  /sessions` - List sessions
//! - `POST /sessions` - Create a session
//! - `GET  /sessions/{id}` - Session detail
//! - `GET  /sessions/{id}/progress` - Progress summary
//! - `POST /sessions/{id}/ratings` - Bulk rating write (all-or-nothing)
//! - `PUT  /sessions/{id}/topics/{topic_id}/rating` - Write one rating
//! - `GET  /sessions/{id}/topics/{topic_id}/rating` - Read one rating
//! - `GET  /sessions/{id}/topics/{topic_id}/allowed-desired` - Allowed desired levels
//! - `GET  /sessions/{id}/export` - JSON export
//! - `GET  /sessions/{id}/export/archive` - Binary archive (base64)
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `RESILO_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `RESILO_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `RESILO_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `resilo::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    allowed_desired_handler, bulk_ratings_handler, create_session_handler, export_archive_handler,
    export_handler, get_rating_handler, get_session_handler, health_handler,
    list_sessions_handler, progress_handler, put_rating_handler, status_handler,
};
#[allow(unused_imports)]
pub use types::{
    AllowedDesiredResponse, ArchiveResponse, BulkRatingItem, BulkRatingResponse,
    BulkRatingUpdateRequest, EntryJson, ErrorBody, HealthResponse, ProgressResponse,
    RatingUpdateRequest, RatingWriteResponse, SessionCreateRequest, SessionCreateResponse,
    SessionDetailResponse, SessionJson, StatusResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use resilo_core::{AssessmentStore, RatingRules, ResiloError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the entry store and the rule engine.
#[derive(Clone)]
pub struct AppState {
    /// The assessment store.
    pub store: Arc<RwLock<AssessmentStore>>,
    /// The configured rule engine, shared read-only.
    pub rules: Arc<RatingRules>,
}

impl AppState {
    /// Create new app state from a store and the deployment's rules.
    #[must_use]
    pub fn new(store: AssessmentStore, rules: RatingRules) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            rules: Arc::new(rules),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `RESILO_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
///
/// # Security Note
///
/// The default is restrictive (localhost only). Set `RESILO_CORS_ORIGINS=*`
/// explicitly only for development or if you understand the security implications.
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("RESILO_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            // Explicit wildcard - warn about security implications
            tracing::warn!(
                "CORS: Allowing ALL origins (RESILO_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            // Parse comma-separated origins
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in RESILO_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            // No configuration - default to localhost only (restrictive)
            tracing::info!("CORS: No RESILO_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    // Check if rate limiting is enabled
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Check if authentication is enabled
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "⚠️  API key authentication DISABLED - all endpoints are publicly accessible! \
             Set RESILO_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/sessions",
            get(handlers::list_sessions_handler).post(handlers::create_session_handler),
        )
        .route("/sessions/{id}", get(handlers::get_session_handler))
        .route("/sessions/{id}/progress", get(handlers::progress_handler))
        .route("/sessions/{id}/ratings", post(handlers::bulk_ratings_handler))
        .route(
            "/sessions/{id}/topics/{topic_id}/rating",
            put(handlers::put_rating_handler).get(handlers::get_rating_handler),
        )
        .route(
            "/sessions/{id}/topics/{topic_id}/allowed-desired",
            get(handlers::allowed_desired_handler),
        )
        .route("/sessions/{id}/export", get(handlers::export_handler))
        .route(
            "/sessions/{id}/export/archive",
            get(handlers::export_archive_handler),
        );

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(
    addr: &str,
    store: AssessmentStore,
    rules: RatingRules,
) -> Result<(), ResiloError> {
    let state = AppState::new(store, rules);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ResiloError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Resilo HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| ResiloError::IoError(format!("Server error: {}", e)))
}
