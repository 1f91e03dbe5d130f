//! HTTP surface
//!
//! JSON endpoints for wallets, user presence and admin sessions. Every response
//! carries a `success` flag; failures add a human-readable `message`.

mod error;
mod handlers;

pub use error::{ApiError, ApiResult, ErrorResponse};

use crate::core::{DocumentStore, PresenceTracker, SessionRegistry, WalletLedger};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: WalletLedger,
    pub presence: PresenceTracker,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Build every service over one shared document store
    pub fn new(store: Arc<DocumentStore>, session_ttl: chrono::Duration) -> Self {
        AppState {
            ledger: WalletLedger::new(Arc::clone(&store)),
            presence: PresenceTracker::new(Arc::clone(&store)),
            sessions: SessionRegistry::new(store, session_ttl),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Wallet endpoints
        .route("/api/wallet/deposit", post(handlers::deposit))
        .route("/api/wallet/withdraw", post(handlers::withdraw))
        .route(
            "/api/wallet/transactions/:user_id",
            get(handlers::list_transactions),
        )
        .route("/api/wallet/:user_id", get(handlers::get_wallet))
        // Presence and admin sessions
        .route(
            "/api/user-presence",
            get(handlers::get_presence).post(handlers::update_presence),
        )
        .route("/api/admin/validate", post(handlers::validate_session))
        .route("/api/admin/logout", post(handlers::logout))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
