//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, ask, auth, credits, health, invitation};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for the paid completion endpoint.
const ASK_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /register` - Register with an invitation code
/// - `POST /login` - Obtain a session token
/// - `POST /logout` - Discard the session
///
/// ## User (bearer session token)
/// - `GET /user` - Current user
/// - `POST /ask` - Run a prompt template (rate-limited)
/// - `GET /invitation-code` - Own invitation code
/// - `GET /invitees` - Users invited by the caller
/// - `POST /redeem` - Redeem a code
/// - `GET /balance` - Paid / gifted balance
/// - `GET /redeemcodes` - Redeemed codes
/// - `GET /gifts` - Received gifts
///
/// ## Admin (`X-Admin-Key`)
/// - `POST /admin/redeem-codes` - Issue redeem codes
/// - `POST /admin/users/:id/vip` - Set the VIP flag
/// - `POST /admin/gifts` - Grant a manual gift
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Every ask costs an upstream call, so it gets its own tighter limit.
    let ask_routes = Router::new()
        .route("/ask", post(ask::ask))
        .layer(ConcurrencyLimitLayer::new(ASK_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Session
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user))
        // Invitations
        .route("/invitation-code", get(invitation::get_invitation_code))
        .route("/invitees", get(invitation::list_invitees))
        // Credits
        .route("/redeem", post(credits::redeem))
        .route("/balance", get(credits::get_balance))
        .route("/redeemcodes", get(credits::list_redeem_codes))
        .route("/gifts", get(credits::list_gifts))
        // Admin
        .route("/admin/redeem-codes", post(admin::generate_redeem_codes))
        .route("/admin/users/:id/vip", post(admin::set_vip))
        .route("/admin/gifts", post(admin::grant_gift))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .merge(ask_routes)
        .merge(api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
