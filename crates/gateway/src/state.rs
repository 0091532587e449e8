//! Geteilter Zustand aller Handler und Verbindungen

use hoersaal_observability::HoersaalMetrics;
use hoersaal_session::SessionEngine;
use tokio_util::sync::CancellationToken;

/// Axum-State fuer REST-Handler und WebSocket-Verbindungen
///
/// Clone teilt Engine, Metriken und Abbruch-Token.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: SessionEngine,
    pub metriken: HoersaalMetrics,
    /// Wird beim Herunterfahren ausgeloest; offene Sockets schliessen sich dann
    pub abbruch: CancellationToken,
}

impl GatewayState {
    pub fn neu(engine: SessionEngine, metriken: HoersaalMetrics) -> Self {
        Self {
            engine,
            metriken,
            abbruch: CancellationToken::new(),
        }
    }

    /// Setzt die Teilnehmer-Gauge auf die aktuelle Roster-Groesse
    pub fn teilnehmer_metrik_aktualisieren(&self) {
        self.metriken
            .participants
            .set(self.engine.roster().len() as f64);
    }
}
