//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use hoersaal_gateway::GatewayKonfig;
use hoersaal_session::SessionConfig;
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerEinstellungen,
    pub netzwerk: NetzwerkEinstellungen,
    /// Grenzen und Puffer der Sitzungs-Engine
    pub sitzung: SitzungsEinstellungen,
    pub logging: LoggingEinstellungen,
    pub observability: ObservabilityEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Hoersaal".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    /// Port fuer REST und WebSocket
    pub http_port: u16,
    /// CORS-Origins (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            http_port: 3001,
            cors_origins: vec![],
        }
    }
}

/// Einstellungen der Sitzungs-Engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitzungsEinstellungen {
    pub min_dauer_sek: u32,
    pub max_dauer_sek: u32,
    /// Dauer wenn eine Umfrage ohne Angabe erstellt wird
    pub standard_dauer_sek: u32,
    pub chat_kapazitaet: usize,
    /// Countdown-Periode in Millisekunden
    pub tick_ms: u64,
    pub sende_queue_groesse: usize,
}

impl Default for SitzungsEinstellungen {
    fn default() -> Self {
        Self {
            min_dauer_sek: 10,
            max_dauer_sek: 300,
            standard_dauer_sek: 60,
            chat_kapazitaet: 100,
            tick_ms: 1000,
            sende_queue_groesse: 64,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Haengt `GET /metrics` ein
    pub metriken: bool,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self { metriken: true }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Bind-Adresse fuer den HTTP-Server (REST + WebSocket)
    pub fn http_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .netzwerk
            .bind_adresse
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{}'", self.netzwerk.bind_adresse))?;
        Ok(SocketAddr::new(ip, self.netzwerk.http_port))
    }

    pub fn session_config(&self) -> SessionConfig {
        let s = &self.sitzung;
        SessionConfig {
            min_dauer_sek: s.min_dauer_sek,
            max_dauer_sek: s.max_dauer_sek,
            standard_dauer_sek: s.standard_dauer_sek,
            chat_kapazitaet: s.chat_kapazitaet,
            // Null-Periode wuerde tokio::time::interval panisch machen
            tick: Duration::from_millis(s.tick_ms.max(1)),
            sende_queue_groesse: s.sende_queue_groesse.max(1),
        }
    }

    pub fn gateway_konfig(&self) -> anyhow::Result<GatewayKonfig> {
        Ok(GatewayKonfig {
            bind_addr: self.http_bind_adresse()?,
            cors_origins: self.netzwerk.cors_origins.clone(),
            metriken_aktiv: self.observability.metriken,
        })
    }
}
