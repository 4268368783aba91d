//! Duel Service
//!
//! HTTP front end for the duel registry. Clients create and join duels,
//! submit commitments and reveals, and poll snapshots until the showdown ends.

pub mod config;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use duel_core::{DuelRegistry, DuelStore};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Registry over a store selected at start-up
pub type SharedRegistry = Arc<DuelRegistry<Arc<dyn DuelStore>>>;

pub fn create_router(registry: SharedRegistry) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        // Duels
        .route("/api/duels", post(handlers::create_duel))
        .route("/api/duels/open", get(handlers::list_open_duels))
        .route(
            "/api/duels/:duel_id",
            get(handlers::get_duel).delete(handlers::delete_duel),
        )
        .route("/api/duels/:duel_id/join", post(handlers::join_duel))
        .route("/api/duels/:duel_id/commit", post(handlers::submit_commitment))
        .route("/api/duels/:duel_id/reveal", post(handlers::submit_reveal))
        .route("/api/duels/:duel_id/advance", post(handlers::advance_round))
        // Parties
        .route("/api/parties/:party/duels", get(handlers::list_duels_for))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(registry)
}
