//! Axum HTTP-Server fuer REST und WebSocket

use std::net::SocketAddr;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use hoersaal_observability::{metrics_router, timing_middleware};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::rest::api_router;
use crate::state::GatewayState;
use crate::ws::ws_handler;

/// Gateway-Konfiguration
#[derive(Debug, Clone)]
pub struct GatewayKonfig {
    pub bind_addr: SocketAddr,
    /// Erlaubte CORS-Origins. Leer = alle Origins erlaubt.
    pub cors_origins: Vec<String>,
    /// `GET /metrics` einhaengen
    pub metriken_aktiv: bool,
}

impl Default for GatewayKonfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            cors_origins: vec![],
            metriken_aktiv: true,
        }
    }
}

/// CORS konfigurieren: entweder spezifische Origins oder Any
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

/// Baut den vollstaendigen Router: `/api/*`, `/ws` und optional `/metrics`
pub fn router(state: GatewayState, konfig: &GatewayKonfig) -> Router {
    let mut app = api_router()
        .route("/ws", get(ws_handler))
        .layer(middleware::from_fn_with_state(
            state.metriken.clone(),
            timing_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&konfig.cors_origins)),
        )
        .with_state(state.clone());

    if konfig.metriken_aktiv {
        app = app.merge(metrics_router(state.metriken.clone()));
    }
    app
}

/// HTTP-Server des Gateways
pub struct Gateway {
    konfig: GatewayKonfig,
}

impl Gateway {
    pub fn neu(konfig: GatewayKonfig) -> Self {
        Self { konfig }
    }

    /// Startet den Server und laeuft bis `state.abbruch` ausgeloest wird
    pub async fn starten(self, state: GatewayState) -> Result<()> {
        let app = router(state.clone(), &self.konfig);

        let listener = tokio::net::TcpListener::bind(self.konfig.bind_addr).await?;
        tracing::info!(addr = %self.konfig.bind_addr, "Gateway gestartet");

        let abbruch = state.abbruch.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { abbruch.cancelled().await })
            .await?;

        tracing::info!("Gateway beendet");
        Ok(())
    }
}
