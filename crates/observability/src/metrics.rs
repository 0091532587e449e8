//! Prometheus-kompatible Metriken fuer Hoersaal
//!
//! Registrierte Metriken:
//! - `hoersaal_connected_clients` – Gauge: Offene Live-Verbindungen
//! - `hoersaal_participants` – Gauge: Teilnehmer im Roster
//! - `hoersaal_polls_started_total` – Counter: Gestartete Umfragen
//! - `hoersaal_responses_total` – Counter: Angenommene Antworten
//! - `hoersaal_chat_messages_total` – Counter: Verteilte Chat-Nachrichten
//! - `hoersaal_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `hoersaal_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit

use anyhow::Result;
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Alle Hoersaal-Prometheus-Metriken
///
/// Jede Instanz hat eine eigene Registry, Clone teilt sie.
#[derive(Clone)]
pub struct HoersaalMetrics {
    pub registry: Arc<Registry>,

    // Sitzungs-Metriken
    pub connected_clients: Gauge,
    pub participants: Gauge,
    pub polls_started_total: IntCounter,
    pub responses_total: IntCounter,
    pub chat_messages_total: IntCounter,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl HoersaalMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Sitzungs-Metriken ---
        let connected_clients = Gauge::with_opts(Opts::new(
            "hoersaal_connected_clients",
            "Anzahl offener Live-Verbindungen",
        ))?;
        registry.register(Box::new(connected_clients.clone()))?;

        let participants = Gauge::with_opts(Opts::new(
            "hoersaal_participants",
            "Anzahl Teilnehmer im Roster",
        ))?;
        registry.register(Box::new(participants.clone()))?;

        let polls_started_total = IntCounter::with_opts(Opts::new(
            "hoersaal_polls_started_total",
            "Gesamtanzahl gestarteter Umfragen",
        ))?;
        registry.register(Box::new(polls_started_total.clone()))?;

        let responses_total = IntCounter::with_opts(Opts::new(
            "hoersaal_responses_total",
            "Gesamtanzahl angenommener Antworten",
        ))?;
        registry.register(Box::new(responses_total.clone()))?;

        let chat_messages_total = IntCounter::with_opts(Opts::new(
            "hoersaal_chat_messages_total",
            "Gesamtanzahl verteilter Chat-Nachrichten",
        ))?;
        registry.register(Box::new(chat_messages_total.clone()))?;

        // --- HTTP-Metriken ---
        let http_requests_total = IntCounterVec::new(
            Opts::new("hoersaal_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "hoersaal_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            connected_clients,
            participants,
            polls_started_total,
            responses_total,
            chat_messages_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router<S>(metriken: HoersaalMetrics) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<HoersaalMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
