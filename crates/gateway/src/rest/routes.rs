//! Route-Definitionen fuer die REST-API (/api/...)

use axum::{
    routing::{get, post},
    Router,
};

use crate::rest::handlers;
use crate::state::GatewayState;

/// Erstellt den vollstaendigen /api/-Router
pub fn api_router() -> Router<GatewayState> {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        // Umfragen
        .route("/api/poll", post(handlers::poll::umfrage_erstellen))
        .route("/api/poll/current", get(handlers::poll::aktueller_zustand))
        .route(
            "/api/poll/history/:creator_id",
            get(handlers::poll::history),
        )
        .route(
            "/api/poll/:poll_id/start",
            post(handlers::poll::umfrage_starten),
        )
        .route(
            "/api/poll/:poll_id/respond",
            post(handlers::poll::antwort_abgeben),
        )
        .route(
            "/api/poll/:poll_id/response/:participant_id",
            get(handlers::poll::antwort_status),
        )
        // Teilnehmer
        .route(
            "/api/participants/join",
            post(handlers::participants::beitreten),
        )
        // Chat
        .route("/api/chat", get(handlers::chat::nachrichten))
}
