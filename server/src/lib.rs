//! hoersaal-server – Bibliotheks-Root
//!
//! Verdrahtet Sitzungs-Engine, Metriken und Gateway zu einem lauffaehigen
//! Server.

pub mod config;

use anyhow::Result;
use config::ServerConfig;
use hoersaal_gateway::{Gateway, GatewayState};
use hoersaal_observability::HoersaalMetrics;
use hoersaal_session::SessionEngine;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet das Gateway und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Sitzungs-Engine und Metriken erzeugen
    /// 2. HTTP-Server (REST + WebSocket) starten
    /// 3. Auf Ctrl-C warten, dann Gateway und Countdown stoppen
    pub async fn starten(self) -> Result<()> {
        let gateway_konfig = self.config.gateway_konfig()?;
        let engine = SessionEngine::neu(self.config.session_config());
        let metriken = HoersaalMetrics::neu()?;
        let state = GatewayState::neu(engine.clone(), metriken);

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %gateway_konfig.bind_addr,
            metriken = gateway_konfig.metriken_aktiv,
            "Server startet"
        );

        let abbruch = state.abbruch.clone();
        let mut gateway = tokio::spawn(Gateway::neu(gateway_konfig).starten(state));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        let vorzeitig = tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                None
            }
            // Gateway endet von selbst, z.B. weil der Port belegt ist
            ergebnis = &mut gateway => Some(ergebnis),
        };

        abbruch.cancel();
        engine.herunterfahren();

        match vorzeitig {
            Some(ergebnis) => ergebnis??,
            None => gateway.await??,
        }
        tracing::info!("Server beendet");
        Ok(())
    }
}
